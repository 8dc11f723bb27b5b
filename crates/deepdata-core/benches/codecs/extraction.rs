use criterion::{criterion_group, criterion_main, Criterion};
use deepdata_core::codec::{DctQimCodec, Embed, Extract, LsbCodec, QimCodec};
use deepdata_core::NoProgress;
use deepdata_jpeg::JpegImage;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, Rgba, RgbaImage};

fn carrier_image() -> RgbaImage {
    let mut rng = fastrand::Rng::with_seed(2);
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

pub fn codec_extraction(c: &mut Criterion) {
    let image = carrier_image();
    let secret_message = b"Hello World!";

    c.bench_function("LSB Extraction", |b| {
        let codec = LsbCodec::default();
        let secret = codec
            .embed(image.as_raw().as_slice(), secret_message, &mut NoProgress)
            .expect("Cannot embed secret message");
        b.iter(|| {
            codec
                .extract(secret.as_slice(), &mut NoProgress)
                .expect("Cannot extract secret message")
        })
    });
    c.bench_function("QIM Extraction", |b| {
        let codec = QimCodec::default();
        let secret = codec
            .embed(&image, secret_message, &mut NoProgress)
            .expect("Cannot embed secret message");
        b.iter(|| {
            codec
                .extract(&secret, &mut NoProgress)
                .expect("Cannot extract secret message")
        })
    });
    c.bench_function("DCT-QIM Extraction", |b| {
        let codec = DctQimCodec::default();
        let secret = codec
            .embed(&carrier_jpeg(), secret_message, &mut NoProgress)
            .expect("Cannot embed secret message");
        b.iter(|| {
            codec
                .extract(&secret, &mut NoProgress)
                .expect("Cannot extract secret message")
        })
    });
}

criterion_group!(benches, codec_extraction);
criterion_main!(benches);
