use std::time::Instant;

use image::{ImageReader, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use sfm_core::{ImageBuffer, PipelineConfig};
use sfm_pipeline::FeaturePipeline;

fn load(path: &str) -> ImageBuffer {
    let img = ImageReader::open(path)
        .expect("Image not found")
        .decode()
        .expect("Decode failed")
        .to_rgb8();
    let (w, h) = img.dimensions();
    ImageBuffer::new(img.into_raw(), w as usize, h as usize, 3)
        .expect("Invalid image buffer")
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let left_path = args.next().unwrap_or_else(|| "left.png".to_string());
    let right_path = args.next().unwrap_or_else(|| "right.png".to_string());

    let left = load(&left_path);
    let right = load(&right_path);

    let pipeline = FeaturePipeline::new(PipelineConfig::default())
        .expect("Failed to build pipeline");

    let t0 = Instant::now();
    let sets = pipeline.extract_all(&[left.clone(), right.clone()]);
    if sets.len() < 2 {
        eprintln!("Not enough keypoints in one of the images");
        std::process::exit(1);
    }

    let result = pipeline
        .match_pair(&sets[0], &sets[1])
        .expect("Matching failed");
    let elapsed = t0.elapsed();

    println!("Time taken: {:.2?}", elapsed);
    println!(
        "Keypoints: {} / {}",
        sets[0].keypoints().len(),
        sets[1].keypoints().len()
    );
    println!("Inlier matches: {}", result.matches.len());
    println!("Homography:\n{}", result.homography);

    // Side-by-side canvas with match lines
    let width = (left.width() + right.width()) as u32;
    let height = left.height().max(right.height()) as u32;
    let mut canvas = RgbImage::new(width, height);
    blit(&mut canvas, &left, 0);
    blit(&mut canvas, &right, left.width() as u32);

    let offset = left.width() as f32;
    for m in &result.matches {
        let q = sets[0].keypoints()[m.query_idx];
        let t = sets[1].keypoints()[m.train_idx];
        draw_hollow_circle_mut(&mut canvas, (q.x as i32, q.y as i32), 3, Rgb([0, 255, 0]));
        draw_hollow_circle_mut(
            &mut canvas,
            ((t.x + offset) as i32, t.y as i32),
            3,
            Rgb([0, 255, 0]),
        );
        draw_line_segment_mut(
            &mut canvas,
            (q.x, q.y),
            (t.x + offset, t.y),
            Rgb([255, 0, 0]),
        );
    }

    canvas
        .save("matches.png")
        .expect("Failed to save output image");
    println!("Saved result image as matches.png");
}

fn blit(canvas: &mut RgbImage, src: &ImageBuffer, x_offset: u32) {
    for y in 0..src.height() {
        for x in 0..src.width() {
            let px = src.pixel(x, y);
            canvas.put_pixel(
                x as u32 + x_offset,
                y as u32,
                Rgb([px[0], px[1], px[2]]),
            );
        }
    }
}
