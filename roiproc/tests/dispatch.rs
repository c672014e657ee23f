use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use roiproc::operators::{MARKER_CENTER, MARKER_OUTLINE};
use roiproc::{
    process, Command, DispatchError, FrameContext, HoughCirclesParams, Operator, OperatorKey,
    ProcParameters, Roi, SobelAxis,
};

fn random_frame(seed: u8, width: u32, height: u32) -> RgbImage {
    let mut rng = Pcg64::from_seed([seed; 32]);
    RgbImage::from_fn(width, height, |_, _| Rgb(rng.gen()))
}

fn disk_frame() -> RgbImage {
    let mut frame = RgbImage::from_pixel(120, 100, Rgb([30, 30, 30]));
    draw_filled_circle_mut(&mut frame, (60, 50), 20, Rgb([230, 230, 230]));
    frame
}

fn hough_params() -> ProcParameters {
    let mut params = ProcParameters::default();
    params.hough_circles = Some(HoughCirclesParams {
        dp: 1.0,
        param1: 100.0,
        param2: 20.0,
        min_radius: 10,
        max_radius: 30,
    });
    params
}

fn run(frame: &RgbImage, command: Command, roi: Option<&Roi>, params: &ProcParameters) -> RgbImage {
    let ctx = FrameContext {
        original: frame,
        roi,
        params,
    };
    process(frame, &command, &ctx).unwrap()
}

#[test]
fn compositing_only_touches_the_roi() {
    let _ = pretty_env_logger::try_init();
    let frame = random_frame(1, 48, 40);
    let params = ProcParameters::default();
    let rois = [
        Roi::new("a", 0, 0, 10, 10).unwrap(),
        Roi::new("b", 13, 7, 41, 29).unwrap(),
        Roi::new("c", 40, 30, 48, 40).unwrap(),
        Roi::new("d", 0, 0, 48, 40).unwrap(),
    ];
    for operator in Operator::ALL.iter().copied().filter(|op| op.composites_via_roi()) {
        for roi in &rois {
            let out = run(&frame, Command::Process(operator), Some(roi), &params);
            assert_eq!(out.dimensions(), frame.dimensions());
            for (x, y, pixel) in out.enumerate_pixels() {
                if !roi.contains(x, y) {
                    assert_eq!(pixel, frame.get_pixel(x, y), "{} changed ({}, {})", operator, x, y);
                }
            }
        }
    }
}

#[test]
fn roi_content_matches_whole_frame_processing_of_the_crop() {
    let frame = random_frame(2, 32, 32);
    let params = ProcParameters::default();
    let roi = Roi::new("roi", 4, 6, 20, 26).unwrap();
    let crop = image::imageops::crop_imm(&frame, 4, 6, 16, 20).to_image();
    for operator in [Operator::Grayscale, Operator::Blur, Operator::Sobel(SobelAxis::XY)] {
        let whole = run(&crop, Command::Process(operator), None, &params);
        let out = run(&frame, Command::Process(operator), Some(&roi), &params);
        for (x, y, pixel) in whole.enumerate_pixels() {
            assert_eq!(pixel, out.get_pixel(x + 4, y + 6));
        }
    }
}

#[test]
fn rollback_restores_the_original() {
    let original = random_frame(3, 30, 20);
    let params = ProcParameters::default();
    let roi = Roi::new("roi", 5, 5, 25, 15).unwrap();
    let mut frame = original.clone();
    for token in [":blur", ":sharpen", ":gray", ":canny", ":sobelX"] {
        let ctx = FrameContext {
            original: &original,
            roi: Some(&roi),
            params: &params,
        };
        frame = process(&frame, &token.parse().unwrap(), &ctx).unwrap();
    }
    assert_ne!(frame, original);
    let ctx = FrameContext {
        original: &original,
        roi: Some(&roi),
        params: &params,
    };
    let restored = process(&frame, &Command::Rollback, &ctx).unwrap();
    assert_eq!(restored.as_raw(), original.as_raw());
}

#[test]
fn gray_is_idempotent() {
    let frame = random_frame(4, 25, 19);
    let params = ProcParameters::empty();
    let once = run(&frame, Command::Process(Operator::Grayscale), None, &params);
    let twice = run(&once, Command::Process(Operator::Grayscale), None, &params);
    assert_eq!(once, twice);
}

#[test]
fn non_processing_commands_are_no_ops() {
    let frame = random_frame(5, 16, 16);
    let original = random_frame(6, 16, 16);
    let params = ProcParameters::empty();
    let ctx = FrameContext {
        original: &original,
        roi: None,
        params: &params,
    };
    for token in [":bogus", "gray", ":d", ":h", ":q", ""] {
        let out = process(&frame, &token.parse().unwrap(), &ctx).unwrap();
        assert_eq!(out, frame, "{:?}", token);
    }
}

#[test]
fn missing_configuration_is_reported() {
    let frame = random_frame(7, 16, 16);
    let params = ProcParameters::empty();
    let ctx = FrameContext {
        original: &frame,
        roi: None,
        params: &params,
    };
    for operator in Operator::ALL {
        let result = process(&frame, &Command::Process(operator), &ctx);
        match operator.config_key() {
            Some(key) => match result {
                Err(DispatchError::MissingOperatorConfiguration(missing)) => assert_eq!(missing, key),
                other => panic!("{} gave {:?}", operator, other.map(|_| ())),
            },
            None => assert!(result.is_ok()),
        }
    }
}

#[test]
fn sobel_axes_read_their_own_entries() {
    let frame = random_frame(8, 16, 16);
    let mut params = ProcParameters::default();
    params.sobel_y = None;
    let ctx = FrameContext {
        original: &frame,
        roi: None,
        params: &params,
    };
    assert!(process(&frame, &":sobelX".parse().unwrap(), &ctx).is_ok());
    assert!(process(&frame, &":sobelXY".parse().unwrap(), &ctx).is_ok());
    assert!(matches!(
        process(&frame, &":sobelY".parse().unwrap(), &ctx),
        Err(DispatchError::MissingOperatorConfiguration(OperatorKey::SobelY))
    ));
}

#[test]
fn roi_outside_the_frame_is_rejected() {
    let frame = random_frame(9, 16, 16);
    let params = ProcParameters::default();
    let roi = Roi::new("roi", 16, 8, 20, 12).unwrap();
    let ctx = FrameContext {
        original: &frame,
        roi: Some(&roi),
        params: &params,
    };
    assert!(matches!(
        process(&frame, &Command::Process(Operator::Blur), &ctx),
        Err(DispatchError::RoiOutOfBounds { width: 16, height: 16, .. })
    ));
}

#[test]
fn roi_overhanging_the_frame_is_clamped() {
    let frame = random_frame(10, 16, 16);
    let params = ProcParameters::default();
    let roi = Roi::new("roi", 8, 4, 40, 12).unwrap();
    let out = run(&frame, Command::Process(Operator::Grayscale), Some(&roi), &params);
    for (x, y, pixel) in out.enumerate_pixels() {
        if (8..16).contains(&x) && (4..12).contains(&y) {
            assert!(pixel[0] == pixel[1] && pixel[1] == pixel[2]);
        } else {
            assert_eq!(pixel, frame.get_pixel(x, y));
        }
    }
}

#[test]
fn no_circles_leaves_the_frame_alone() {
    let frame = RgbImage::from_pixel(64, 48, Rgb([120, 80, 40]));
    let roi = Roi::new("roi", 10, 10, 50, 40).unwrap();
    let params = hough_params();
    assert_eq!(run(&frame, Command::Process(Operator::Circles), None, &params), frame);
    assert_eq!(run(&frame, Command::Process(Operator::Circles), Some(&roi), &params), frame);
}

#[test]
fn circle_markers_land_on_the_full_frame() {
    let frame = disk_frame();
    let params = hough_params();
    let roi = Roi::new("roi", 30, 20, 95, 85).unwrap();
    let out = run(&frame, Command::Process(Operator::Circles), Some(&roi), &params);
    assert_eq!(out.dimensions(), frame.dimensions());

    // The centre marker sits where the disk is in frame coordinates.
    let near_center = (57..=63)
        .flat_map(|x| (47..=53).map(move |y| (x, y)))
        .any(|(x, y)| *out.get_pixel(x, y) == MARKER_CENTER);
    assert!(near_center);
    assert!(out.pixels().any(|p| *p == MARKER_OUTLINE));

    // Nothing far from the disk changed.
    for (x, y, pixel) in out.enumerate_pixels() {
        if (x as i32 - 60).abs() > 26 || (y as i32 - 50).abs() > 26 {
            assert_eq!(pixel, frame.get_pixel(x, y));
        }
    }
}

#[test]
fn circle_detection_without_roi_matches_roi_offset() {
    let frame = disk_frame();
    let params = hough_params();
    let whole = run(&frame, Command::Process(Operator::Circles), None, &params);
    let center = whole
        .enumerate_pixels()
        .find(|(_, _, p)| **p == MARKER_CENTER)
        .map(|(x, y, _)| (x, y));
    assert!(center.is_some());
    let (x, y) = center.unwrap();
    assert!((55..=65).contains(&x) && (45..=55).contains(&y));
}

#[test]
fn circle_markers_may_leave_a_tight_roi() {
    // The region holds the upper half of the disk and its centre, so the lower
    // half of the outline falls below it.
    let frame = disk_frame();
    let mut params = hough_params();
    params.hough_circles = Some(HoughCirclesParams {
        param2: 12.0,
        ..hough_params().hough_circles.unwrap()
    });
    let roi = Roi::new("roi", 30, 20, 90, 56).unwrap();
    let out = run(&frame, Command::Process(Operator::Circles), Some(&roi), &params);
    assert!(out
        .enumerate_pixels()
        .any(|(x, y, p)| *p == MARKER_OUTLINE && y >= 66 && (50..=70).contains(&x)));
    let outside = out
        .enumerate_pixels()
        .filter(|(x, y, p)| **p == MARKER_OUTLINE && !roi.contains(*x, *y))
        .count();
    assert!(outside > 0);
}

#[test]
fn unbounded_radius_range_does_not_exhaust_memory() {
    let frame = disk_frame();
    let mut params = hough_params();
    params.hough_circles = Some(HoughCirclesParams {
        max_radius: u32::MAX,
        ..hough_params().hough_circles.unwrap()
    });
    let out = run(&frame, Command::Process(Operator::Circles), None, &params);
    assert!(out.pixels().any(|p| *p == MARKER_CENTER));
}
