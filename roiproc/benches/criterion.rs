use criterion::{criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use roiproc::{process, Command, FrameContext, Operator, ProcParameters, Roi, SobelAxis};

fn load_frame() -> RgbImage {
    let mut rng = Pcg64::from_seed([3; 32]);
    RgbImage::from_fn(320, 240, |_, _| Rgb(rng.gen()))
}

fn dispatch(c: &mut Criterion) {
    let frame = load_frame();
    let params = ProcParameters::default();
    let roi = Roi::new("bench", 40, 30, 200, 150).unwrap();
    for operator in [
        Operator::Grayscale,
        Operator::Blur,
        Operator::Sharpen,
        Operator::Sobel(SobelAxis::XY),
        Operator::Canny,
    ] {
        let command = Command::Process(operator);
        c.bench_function(&format!("{}_full", operator), |b| {
            let ctx = FrameContext {
                original: &frame,
                roi: None,
                params: &params,
            };
            b.iter(|| process(&frame, &command, &ctx).unwrap())
        });
        c.bench_function(&format!("{}_roi", operator), |b| {
            let ctx = FrameContext {
                original: &frame,
                roi: Some(&roi),
                params: &params,
            };
            b.iter(|| process(&frame, &command, &ctx).unwrap())
        });
    }
}

fn circles(c: &mut Criterion) {
    let mut frame = RgbImage::from_pixel(320, 240, Rgb([20, 20, 20]));
    imageproc::drawing::draw_filled_circle_mut(&mut frame, (160, 120), 50, Rgb([220, 220, 220]));
    let params = ProcParameters::default();
    let ctx = FrameContext {
        original: &frame,
        roi: None,
        params: &params,
    };
    let command = Command::Process(Operator::Circles);
    c.bench_function("HoughCircles_full", |b| {
        b.iter(|| process(&frame, &command, &ctx).unwrap())
    });
}

criterion_group!(
    name = roiproc;
    config = Criterion::default().sample_size(10);
    targets = dispatch, circles
);

criterion_main!(roiproc);
