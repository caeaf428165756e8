/// Frame descriptors and the sequencer.
pub mod sequencer;
