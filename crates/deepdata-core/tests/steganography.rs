use std::fs;
use std::path::{Path, PathBuf};

use deepdata_core::codec::{Capacity, Embed, Extract, LsbCodec, QimCodec};
use deepdata_core::codec_options::{
    ColorChannels, DctQimOptions, JpegComponents, LsbOptions, QimOptions,
};
use deepdata_core::{BitStream, CodecOptions, DeepDataError, Method, NoProgress};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, Rgba, RgbaImage};
use speculate::speculate;
use tempfile::TempDir;

fn noisy_image(width: u32, height: u32, seed: u64) -> RgbaImage {
    let mut rng = fastrand::Rng::with_seed(seed);
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 4) as u8 ^ rng.u8(0..48),
            (y * 4) as u8 ^ rng.u8(0..48),
            rng.u8(..),
            255,
        ])
    })
}

fn png_carrier(dir: &Path) -> PathBuf {
    let path = dir.join("carrier.png");
    noisy_image(96, 64, 1).save(&path).expect("carrier not written");
    path
}

fn jpeg_carrier(dir: &Path) -> PathBuf {
    let path = dir.join("carrier.jpg");
    let rgb = image::DynamicImage::ImageRgba8(noisy_image(96, 64, 2)).to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 85)
        .encode(rgb.as_raw(), 96, 64, ColorType::Rgb8)
        .expect("carrier not encoded");
    fs::write(&path, bytes).expect("carrier not written");
    path
}

fn round_trip(carrier: &Path, options: CodecOptions, payload: &[u8]) -> Vec<u8> {
    let dir = carrier.parent().expect("carrier has a folder");
    let extension = carrier
        .extension()
        .and_then(|e| e.to_str())
        .expect("carrier has an extension");
    let secret = dir.join(format!("secret.{}", if extension == "jpg" { "jpg" } else { "png" }));

    deepdata_core::api::embed::prepare()
        .with_options(options)
        .with_payload(payload)
        .with_image(carrier)
        .with_output(&secret)
        .execute()
        .expect("embedding failed");

    deepdata_core::api::extract::prepare()
        .with_options(options)
        .from_secret_file(&secret)
        .extract_bytes()
        .expect("extraction failed")
}

speculate! {
    describe "lsb on raw bytes" {
        it "should hide 'hi' in 1000 zero bytes with strength 2" {
            let source = vec![0u8; 1000];
            let codec = LsbCodec::new(LsbOptions::new(2).unwrap());

            assert_eq!(codec.capacity(source.as_slice()), 250);
            let secret = codec.embed(source.as_slice(), b"hi", &mut NoProgress).unwrap();
            assert_eq!(codec.extract(secret.as_slice(), &mut NoProgress).unwrap(), b"hi");
        }

        it "should refuse one byte in four bytes with strength 1" {
            let source = [0u8; 4];
            let codec = LsbCodec::new(LsbOptions::new(1).unwrap());

            let result = codec.embed(&source[..], &[0x42], &mut NoProgress);
            assert!(matches!(result, Err(DeepDataError::CapacityExceeded { required: 5, .. })));
        }
    }

    describe "qim on pixels" {
        it "should hide 0xAA in a gray 40x40 image" {
            let image = RgbaImage::from_pixel(40, 40, Rgba([128, 128, 128, 255]));
            let codec = QimCodec::new(QimOptions::new(4, ColorChannels::ALL).unwrap());

            let secret = codec.embed(&image, &[0xAA], &mut NoProgress).unwrap();
            assert_eq!(codec.extract(&secret, &mut NoProgress).unwrap(), [0xAA]);
        }
    }

    describe "capacity" {
        before {
            let dir = TempDir::new().unwrap();
            let png = png_carrier(dir.path());
            let jpg = jpeg_carrier(dir.path());
        }

        it "should not change between calls on the same carrier" {
            for (carrier, method) in [(&png, Method::Lsb), (&png, Method::Qim), (&jpg, Method::DctQim)] {
                let first = deepdata_core::commands::capacity(carrier, Some(method.into())).unwrap();
                let second = deepdata_core::commands::capacity(carrier, Some(method.into())).unwrap();
                assert_eq!(first, second, "{method}");
                assert!(first > 0, "{method}");
            }
        }

        it "should pick dct-qim for jpeg files by default" {
            let auto = deepdata_core::commands::capacity(&jpg, None).unwrap();
            let dct = deepdata_core::commands::capacity(&jpg, Some(Method::DctQim.into())).unwrap();
            assert_eq!(auto, dct);
        }

        it "should refuse a payload one byte beyond it" {
            let available = deepdata_core::commands::capacity(&jpg, Some(Method::DctQim.into())).unwrap();
            let result = deepdata_core::api::embed::prepare()
                .with_method(Method::DctQim)
                .with_payload(vec![7u8; available - 3])
                .with_image(&jpg)
                .with_output(dir.path().join("too-much.jpg"))
                .execute();

            assert!(matches!(result, Err(DeepDataError::CapacityExceeded { .. })));
        }
    }

    describe "round trips through files" {
        before {
            let dir = TempDir::new().unwrap();
            let payload: Vec<u8> = (0..=255u8).cycle().take(300).collect();
        }

        it "should round trip lsb through png" {
            let options = CodecOptions::Lsb(LsbOptions::new(3).unwrap());
            assert_eq!(round_trip(&png_carrier(dir.path()), options, &payload), payload);
        }

        it "should round trip qim through png" {
            let options = CodecOptions::Qim(QimOptions::new(10, ColorChannels::G).unwrap());
            assert_eq!(round_trip(&png_carrier(dir.path()), options, &payload[..100]), &payload[..100]);
        }

        it "should round trip lsb from a jpeg carrier into png" {
            let carrier = jpeg_carrier(dir.path());
            let secret = dir.path().join("from-jpeg.png");
            deepdata_core::api::embed::prepare()
                .with_method(Method::Lsb)
                .with_payload(payload.clone())
                .with_image(&carrier)
                .with_output(&secret)
                .execute()
                .unwrap();

            let extracted = deepdata_core::api::extract::prepare()
                .from_secret_file(&secret)
                .extract_bytes()
                .unwrap();
            assert_eq!(extracted, payload);
        }

        it "should round trip dct-qim through jpeg" {
            let options = CodecOptions::DctQim(DctQimOptions::default());
            assert_eq!(round_trip(&jpeg_carrier(dir.path()), options, &payload[..64]), &payload[..64]);
        }

        it "should round trip dct-qim on luma with a narrow window" {
            let options = CodecOptions::DctQim(DctQimOptions::new(16, JpegComponents::Y, 16).unwrap());
            assert_eq!(round_trip(&jpeg_carrier(dir.path()), options, b"luma"), b"luma");
        }

        it "should refuse to write pixel methods into jpeg" {
            let result = deepdata_core::api::embed::prepare()
                .with_method(Method::Qim)
                .with_payload("lossy")
                .with_image(png_carrier(dir.path()))
                .with_output(dir.path().join("secret.jpg"))
                .execute();

            assert!(matches!(result, Err(DeepDataError::UnsupportedMedia)));
        }
    }

    describe "frames" {
        it "should detect a header longer than the stream" {
            let mut stream = BitStream::new(64);
            stream.write_uint(5, 32).unwrap();

            assert!(matches!(
                stream.read_payload_with_header(),
                Err(DeepDataError::CorruptFrame { required_bits: 72, available_bits: 64 })
            ));
        }

        it "should not find a payload in a carrier embedded with other options" {
            let dir = TempDir::new().unwrap();
            let carrier = jpeg_carrier(dir.path());
            let secret = dir.path().join("secret.jpg");
            deepdata_core::api::embed::prepare()
                .with_options(CodecOptions::DctQim(DctQimOptions::new(6, JpegComponents::ALL, 64).unwrap()))
                .with_payload("delta six")
                .with_image(&carrier)
                .with_output(&secret)
                .execute()
                .unwrap();

            let other = deepdata_core::api::extract::prepare()
                .with_options(CodecOptions::DctQim(DctQimOptions::new(6, JpegComponents::CB, 64).unwrap()))
                .from_secret_file(&secret)
                .extract_bytes();
            assert_ne!(other.ok().as_deref(), Some(&b"delta six"[..]));
        }
    }
}
