use crate::operators::{apply, draw_circles, Output};
use crate::{Command, ProcParameters, Result, Roi};
use image::imageops::{crop_imm, replace};
use image::RgbImage;
use log::{debug, info};
use std::borrow::Cow;

/// Everything a command may read besides the frame it transforms.
#[derive(Debug, Copy, Clone)]
pub struct FrameContext<'a> {
    /// The frame as it was loaded, restored by rollback.
    pub original: &'a RgbImage,
    /// The active region of interest, if any.
    pub roi: Option<&'a Roi>,
    pub params: &'a ProcParameters,
}

/// Apply `command` to `frame` and return the resulting frame.
///
/// With an active region the operator only sees the part of that region
/// inside the frame. Operators that
/// composite have their output written back into it, so pixels outside the
/// region are untouched. Circle detection instead draws its markers on the
/// full frame, offset to where the region lies. Rollback returns the original
/// frame. Commands that are not processing commands return `frame` unchanged.
///
/// On error `frame` is left as it was.
pub fn process(frame: &RgbImage, command: &Command, ctx: &FrameContext<'_>) -> Result<RgbImage> {
    let operator = match command {
        Command::Process(operator) => *operator,
        Command::Rollback => {
            debug!("rolling back to the original frame");
            return Ok(ctx.original.clone());
        }
        _ => return Ok(frame.clone()),
    };
    if let Some(key) = operator.config_key() {
        ctx.params.require(key)?;
    }
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Ok(frame.clone());
    }

    let roi = ctx
        .roi
        .map(|roi| roi.clamped(width, height))
        .transpose()?;
    let target = match &roi {
        Some(roi) => {
            Cow::Owned(crop_imm(frame, roi.x0(), roi.y0(), roi.width(), roi.height()).to_image())
        }
        None => Cow::Borrowed(frame),
    };

    let out = match apply(operator, &target, ctx.params)? {
        Output::Image(processed) => match &roi {
            Some(roi) if operator.composites_via_roi() => {
                let mut out = frame.clone();
                replace(&mut out, &processed, roi.x0() as i64, roi.y0() as i64);
                out
            }
            _ => processed,
        },
        Output::Markers(circles) => {
            let offset = roi.as_ref().map_or((0, 0), |roi| (roi.x0(), roi.y0()));
            let mut out = frame.clone();
            draw_circles(&mut out, &circles, offset);
            out
        }
    };
    info!("{} applied", operator);
    Ok(out)
}
