use crate::{help_lines, process, Command, FrameContext, ProcParameters, Result, Selection};
use image::RgbImage;
use log::debug;

/// The state a player carries between commands: the parameter set, the
/// region selection, and the loaded and current frames.
#[derive(Debug, Clone)]
pub struct Session {
    params: ProcParameters,
    selection: Selection,
    original: RgbImage,
    frame: RgbImage,
}

impl Session {
    pub fn new(params: ProcParameters) -> Self {
        Self {
            params,
            selection: Selection::Idle,
            original: RgbImage::new(0, 0),
            frame: RgbImage::new(0, 0),
        }
    }

    /// Make `frame` both the original and the current frame. The selection is
    /// kept.
    pub fn load_frame(&mut self, frame: RgbImage) {
        self.original = frame.clone();
        self.frame = frame;
    }

    pub fn frame(&self) -> &RgbImage {
        &self.frame
    }

    pub fn original(&self) -> &RgbImage {
        &self.original
    }

    pub fn into_frame(self) -> RgbImage {
        self.frame
    }

    pub fn params(&self) -> &ProcParameters {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ProcParameters {
        &mut self.params
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Run one command and return the messages it produced for the user.
    ///
    /// A failing command leaves the current frame as it was.
    pub fn execute(&mut self, command: &Command) -> Result<Vec<String>> {
        debug!("executing {}", command);
        let messages = match command {
            Command::DeleteRoi => {
                self.selection.delete();
                vec!["ROI deleted".to_owned()]
            }
            Command::Help => help_lines(),
            Command::Quit | Command::Unknown(_) => vec![],
            Command::Rollback | Command::Process(_) => {
                let ctx = FrameContext {
                    original: &self.original,
                    roi: self.selection.active_roi(),
                    params: &self.params,
                };
                self.frame = process(&self.frame, command, &ctx)?;
                match command.operator() {
                    Some(operator) => vec![operator.to_string()],
                    None => vec!["rollback".to_owned()],
                }
            }
        };
        Ok(messages)
    }
}
