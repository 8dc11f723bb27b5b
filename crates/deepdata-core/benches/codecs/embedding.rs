use criterion::{criterion_group, criterion_main, Criterion};
use deepdata_core::codec::{DctQimCodec, Embed, LsbCodec, QimCodec};
use deepdata_core::NoProgress;
use deepdata_jpeg::JpegImage;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, Rgba, RgbaImage};

fn carrier_image() -> RgbaImage {
    let mut rng = fastrand::Rng::with_seed(1);
    RgbaImage::from_fn(512, 512, |_, _| Rgba([rng.u8(..), rng.u8(..), rng.u8(..), 255]))
}

fn carrier_jpeg() -> JpegImage {
    let image = image::DynamicImage::ImageRgba8(carrier_image()).to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 90)
        .encode(image.as_raw(), 512, 512, ColorType::Rgb8)
        .expect("Carrier is not encodable.");
    JpegImage::decode(&bytes).expect("Carrier is not decodable.")
}

pub fn codec_embedding(c: &mut Criterion) {
    let image = carrier_image();
    let jpeg = carrier_jpeg();
    let secret_message = vec![0x5A; 4096];

    c.bench_function("LSB Embedding", |b| {
        let codec = LsbCodec::default();
        b.iter(|| {
            codec
                .embed(image.as_raw().as_slice(), &secret_message, &mut NoProgress)
                .expect("Cannot embed secret message")
        })
    });
    c.bench_function("QIM Embedding", |b| {
        let codec = QimCodec::default();
        b.iter(|| {
            codec
                .embed(&image, &secret_message, &mut NoProgress)
                .expect("Cannot embed secret message")
        })
    });
    c.bench_function("DCT-QIM Embedding", |b| {
        let codec = DctQimCodec::default();
        b.iter(|| {
            codec
                .embed(&jpeg, &secret_message[..1024], &mut NoProgress)
                .expect("Cannot embed secret message")
        })
    });
}

criterion_group!(benches, codec_embedding);
criterion_main!(benches);
