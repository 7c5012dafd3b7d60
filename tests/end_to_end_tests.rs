mod common;

use common::fixtures::{raffle, with_assets};
use common::stubs::{Event, PendingAssetLoader, RecordingNotifier};
use common::{GeneratedPdf, Harness, TestResult, init_logging, test_config};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
use ticketpress::traits::InMemoryResourceProvider;
use ticketpress::{OutputMode, PipelineBuilder, PipelineConfig};
use ticketpress_executor::{InlineOffload, OffloadImpl};

fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbaImage::from_pixel(width, height, Rgba(color))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}

#[tokio::test]
async fn slow_assets_time_out_and_tickets_render_without_them() -> TestResult {
    let harness = Harness::new();
    let config = PipelineConfig {
        image_load_timeout_ms: 100,
        ..test_config()
    };
    let pipeline = harness
        .builder(config)
        .with_asset_loader(Arc::new(PendingAssetLoader::with_ready(&["qr.png"])))
        .build()?;

    let request = with_assets(raffle(1, 6), "slow.png", "qr.png");
    let report = pipeline.generate(&request, OutputMode::Download).await?;

    assert_eq!(report.pages, 1);
    let pages = harness.rasterizer.pages();
    assert_eq!(pages[0].assets, 1, "only the QR image arrives");
    assert_eq!(harness.notifier.count(|e| matches!(e, Event::Error(_))), 0);
    assert!(matches!(harness.notifier.terminal()[..], [Event::Success(_)]));
    Ok(())
}

#[tokio::test]
async fn real_rasterizer_writes_spooled_pdfs_to_disk() -> TestResult {
    init_logging();
    let out = tempfile::tempdir()?;
    let provider = InMemoryResourceProvider::with_entries([
        ("bg.png", png(64, 32, [20, 120, 200, 255])),
        ("qr.png", png(16, 16, [0, 0, 0, 255])),
    ]);
    let notifier = Arc::new(RecordingNotifier::default());
    let config = PipelineConfig {
        spool_to_disk: true,
        ..test_config()
    };
    let pipeline = PipelineBuilder::new()
        .with_config(config)
        .with_offload(OffloadImpl::Inline(InlineOffload))
        .with_resource_provider(Arc::new(provider))
        .with_notifier(notifier.clone())
        .with_output_dir(out.path())
        .build()?;

    let request = with_assets(raffle(1, 12), "bg.png", "qr.png");
    let report = pipeline.generate(&request, OutputMode::Download).await?;

    assert_eq!(report.files.len(), 1);
    let saved = &report.files[0];
    assert_eq!(saved.path, out.path().join("tickets_1-12.pdf"));

    let pdf = GeneratedPdf::from_path(&saved.path)?;
    assert_pdf_page_count!(pdf, 2);
    assert_pdf_pages_are_images!(pdf, 159, 225);
    assert!(pdf.bytes.starts_with(b"%PDF"));
    assert_eq!(notifier.count(|e| matches!(e, Event::Warning(_))), 0);
    Ok(())
}

#[tokio::test]
async fn rayon_offload_produces_the_same_layout() -> TestResult {
    init_logging();
    let out = tempfile::tempdir()?;
    let config = PipelineConfig {
        offload_threads: 2,
        ..test_config()
    };
    let pipeline = PipelineBuilder::new()
        .with_config(config)
        .with_output_dir(out.path())
        .build()?;

    let report = pipeline.generate(&raffle(40, 64), OutputMode::Download).await?;

    assert_eq!(report.tickets_processed, 25);
    let pdf = GeneratedPdf::from_path(&report.files[0].path)?;
    assert_pdf_page_count!(pdf, 5);
    Ok(())
}
