//! `VisionCamera` trait for the vision co-processor link.

use romi_perception::PipelineResult;
use romi_types::RomiError;

/// A named camera pipeline running on the vision co-processor.
pub trait VisionCamera: Send + Sync {
    /// Pipeline name, e.g. `"photonvision"`.
    fn name(&self) -> &str;

    /// Pull the most recent pipeline output.  Calling this again without a
    /// new frame having been processed returns the same result.
    ///
    /// # Errors
    ///
    /// Returns [`RomiError::HardwareFault`] if the co-processor link is down.
    fn latest_result(&mut self) -> Result<PipelineResult, RomiError>;

    /// Ask the co-processor to save the next raw input image.
    fn take_input_snapshot(&mut self);

    /// Ask the co-processor to save the next annotated output image.
    fn take_output_snapshot(&mut self);
}
