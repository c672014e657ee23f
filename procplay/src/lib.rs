//! Drives a [`Session`] from a command script, the way a user at the player
//! would: drag a region, type commands, look at the result.

use image::RgbImage;
use log::{error, info, warn};
use roiproc::{Command, DispatchError, ProcParameters, Session};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the parameter file created next to the outputs.
pub const DEFAULT_PARAMS_FILE: &str = "proc_pars.json";

#[derive(Debug, Error)]
pub enum PlayError {
    #[error("script line {line}: {reason}")]
    Script { line: usize, reason: String },
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlayError>;

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Drag a region from `from` to `to`.
    Select {
        from: (i32, i32),
        to: (i32, i32),
        tag: String,
    },
    Command(Command),
}

fn parse_action(line: &str) -> std::result::Result<Action, String> {
    let mut words = line.split_whitespace();
    if words.next() != Some("select") {
        let command: Command = match line.parse() {
            Ok(command) => command,
            Err(never) => match never {},
        };
        return Ok(Action::Command(command));
    }
    let mut coords = [0i32; 4];
    for coord in &mut coords {
        let word = words
            .next()
            .ok_or_else(|| "select needs four coordinates".to_owned())?;
        *coord = word
            .parse()
            .map_err(|_| format!("`{}` is not a coordinate", word))?;
    }
    let tag = words.next().unwrap_or("roi").to_owned();
    if let Some(extra) = words.next() {
        return Err(format!("unexpected `{}` after the tag", extra));
    }
    Ok(Action::Select {
        from: (coords[0], coords[1]),
        to: (coords[2], coords[3]),
        tag,
    })
}

/// Parse a script: one command token or `select X0 Y0 X1 Y1 [TAG]` per line.
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_script(text: &str) -> Result<Vec<Action>> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line_number, line)| {
            parse_action(line).map_err(|reason| PlayError::Script {
                line: line_number,
                reason,
            })
        })
        .collect()
}

/// Where the processed frame and its log go: `<stem>_proc.png` and
/// `<stem>_proc_logger.txt` inside `output_dir`.
pub fn output_paths(output_dir: &Path, frame: &Path) -> (PathBuf, PathBuf) {
    let stem = frame
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_owned());
    (
        output_dir.join(format!("{}_proc.png", stem)),
        output_dir.join(format!("{}_proc_logger.txt", stem)),
    )
}

/// The directory outputs go to when none is given: the one holding `frame`.
pub fn default_output_dir(frame: &Path) -> PathBuf {
    match frame.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Load the parameter set from `json`, or from `proc_pars.json` in
/// `output_dir`, writing the defaults there first if it does not exist.
pub fn resolve_params(json: Option<&Path>, output_dir: &Path) -> Result<ProcParameters> {
    let path = match json {
        Some(path) => path.to_path_buf(),
        None => {
            let path = output_dir.join(DEFAULT_PARAMS_FILE);
            ProcParameters::create_default(&path)?;
            path
        }
    };
    Ok(ProcParameters::load(path)?)
}

/// Run `actions` on the session's current frame and return the messages.
///
/// A failing command is reported in the messages and the script goes on with
/// the frame as it was. `:q` ends the script.
pub fn play(session: &mut Session, actions: &[Action]) -> Vec<String> {
    let mut messages = vec![];
    for action in actions {
        match action {
            Action::Select { from, to, tag } => {
                let (width, height) = session.frame().dimensions();
                let selection = session.selection_mut();
                selection.begin_drag(*from);
                selection.drag_to(*to);
                match selection.finish_drag(tag, width, height) {
                    Some(roi) => messages.push(format!(
                        "ROI {} ({}, {})-({}, {})",
                        roi.tag(),
                        roi.x0(),
                        roi.y0(),
                        roi.x1(),
                        roi.y1()
                    )),
                    None => {
                        warn!("empty selection {:?} to {:?} ignored", from, to);
                        messages.push("empty selection ignored".to_owned());
                    }
                }
            }
            Action::Command(Command::Quit) => break,
            Action::Command(command) => match session.execute(command) {
                Ok(produced) => messages.extend(produced),
                Err(e) => {
                    error!("{} failed: {}", command, e);
                    messages.push(format!("{} failed: {}", command, e));
                }
            },
        }
    }
    messages
}

/// Process one frame file and write its outputs. Returns the processed image
/// path.
pub fn play_file(
    session: &mut Session,
    frame_path: &Path,
    actions: &[Action],
    output_dir: &Path,
) -> Result<PathBuf> {
    let frame: RgbImage = image::open(frame_path)?.to_rgb8();
    info!(
        "playing {} ({}x{})",
        frame_path.display(),
        frame.width(),
        frame.height()
    );
    session.load_frame(frame);
    let messages = play(session, actions);

    let (image_path, log_path) = output_paths(output_dir, frame_path);
    session.frame().save(&image_path)?;
    let mut log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    for message in &messages {
        writeln!(log, "{}", message)?;
    }
    info!("wrote {}", image_path.display());
    Ok(image_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roiproc::Operator;

    #[test]
    fn parses_scripts() {
        let script = "# warm up\n:gray\n\nselect 10 5 2 1 face\n  :canny  \nselect 0 0 4 4\n:q\n";
        let actions = parse_script(script).unwrap();
        assert_eq!(
            actions,
            vec![
                Action::Command(Command::Process(Operator::Grayscale)),
                Action::Select {
                    from: (10, 5),
                    to: (2, 1),
                    tag: "face".to_owned()
                },
                Action::Command(Command::Process(Operator::Canny)),
                Action::Select {
                    from: (0, 0),
                    to: (4, 4),
                    tag: "roi".to_owned()
                },
                Action::Command(Command::Quit),
            ]
        );
    }

    #[test]
    fn bad_select_names_the_line() {
        match parse_script(":gray\nselect 1 2 x 4\n") {
            Err(PlayError::Script { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse_script("select 1 2 3").is_err());
        assert!(parse_script("select 1 2 3 4 tag extra").is_err());
    }

    #[test]
    fn output_naming() {
        let (image, log) = output_paths(Path::new("out"), Path::new("clips/frame_01.jpg"));
        assert_eq!(image, Path::new("out/frame_01_proc.png"));
        assert_eq!(log, Path::new("out/frame_01_proc_logger.txt"));
        assert_eq!(default_output_dir(Path::new("clips/a.png")), Path::new("clips"));
        assert_eq!(default_output_dir(Path::new("a.png")), Path::new("."));
    }
}
