//! Integration tests for photo attachments.
//!
//! Writes real image files, attaches them through `/image <path>` and
//! checks what ends up on tasks and messages.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::cast_possible_truncation)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};

use portal::app::{App, PanelFocus};
use portal::attachment::{self, AttachmentError, DownscaleOptions, PendingAttachment};
use portal::config::PortalConfig;
use portal::session::{Session, SessionConfig};
use portal::storage::MemoryStore;
use portal_proto::inline::InlineImage;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Writes a `width` x `height` RGBA PNG and returns its path.
fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 200, 128])
    }));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Decodes an inline image back into pixels.
fn decode_inline(image: &InlineImage) -> DynamicImage {
    assert_eq!(image.media_type(), Some("image/jpeg"));
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(image.base64_payload().unwrap())
        .unwrap();
    image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap()
}

fn make_app() -> App {
    let session = Session::open(Arc::new(MemoryStore::new()), &SessionConfig::default());
    App::new(session, &PortalConfig::default())
}

fn press(app: &mut App, code: KeyCode) {
    app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
}

fn submit(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
    press(app, KeyCode::Enter);
}

/// Polls until neither input has an attachment in flight.
async fn settle(app: &mut App) {
    for _ in 0..500 {
        app.poll_attachments();
        if !app.task_attachment.is_preparing() && !app.chat_attachment.is_preparing() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("attachment did not finish");
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn wide_photo_is_shrunk_to_max_width() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "wide.png", 1600, 900);

    let result = PendingAttachment::spawn(&path, DownscaleOptions::default())
        .wait()
        .await
        .unwrap();
    assert_eq!((result.width, result.height), (800, 450));
    assert_eq!(decode_inline(&result.image).dimensions(), (800, 450));
}

#[tokio::test]
async fn narrow_photo_keeps_its_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "small.png", 320, 240);

    let options = DownscaleOptions {
        max_width: 400,
        jpeg_quality: 50,
    };
    let result = attachment::load_file(&path, &options).unwrap();
    assert_eq!((result.width, result.height), (320, 240));
    assert_eq!(decode_inline(&result.image).dimensions(), (320, 240));
}

#[tokio::test]
async fn non_image_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "not a picture").unwrap();

    let err = PendingAttachment::spawn(&path, DownscaleOptions::default())
        .wait()
        .await
        .unwrap_err();
    assert!(matches!(err, AttachmentError::Decode(_)));
}

// ---------------------------------------------------------------------------
// Through the App
// ---------------------------------------------------------------------------

#[tokio::test]
async fn task_gets_attached_photo() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "leak.png", 1000, 500);
    let mut app = make_app();

    submit(&mut app, &format!("/image {}", path.display()));
    assert!(app.task_input.text().is_empty());
    settle(&mut app).await;
    assert!(app.notice.as_deref().unwrap().starts_with("Photo attached"));

    submit(&mut app, "Leak under sink");
    let task = &app.session.tasks().tasks()[0];
    assert_eq!(task.text, "Leak under sink");
    let image = task.image.as_ref().expect("task has photo");
    assert_eq!(decode_inline(image).dimensions(), (800, 400));
    assert!(app.task_attachment.ready().is_none());
}

#[tokio::test]
async fn image_only_message_is_sent() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "meter.png", 200, 100);
    let mut app = make_app();
    press(&mut app, KeyCode::BackTab);
    assert_eq!(app.focus, PanelFocus::ChatInput);

    submit(&mut app, &format!("/image {}", path.display()));
    settle(&mut app).await;
    press(&mut app, KeyCode::Enter);

    let msg = app.session.thread().last().expect("message sent");
    assert!(msg.text.is_none());
    assert!(msg.has_image());
}

#[tokio::test]
async fn submit_while_preparing_keeps_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "big.png", 2400, 1600);
    let mut app = make_app();

    submit(&mut app, &format!("/image {}", path.display()));
    submit(&mut app, "Cracked tile");
    if app.task_attachment.is_preparing() {
        assert!(app.session.tasks().is_empty());
        assert_eq!(app.task_input.text(), "Cracked tile");
        settle(&mut app).await;
        press(&mut app, KeyCode::Enter);
    }
    assert_eq!(app.session.tasks().len(), 1);
    assert!(app.session.tasks().tasks()[0].image.is_some());
}

#[tokio::test]
async fn staging_again_replaces_previous_photo() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_png(dir.path(), "first.png", 100, 100);
    let second = write_png(dir.path(), "second.png", 60, 30);
    let mut app = make_app();

    submit(&mut app, &format!("/image {}", first.display()));
    submit(&mut app, &format!("/image {}", second.display()));
    settle(&mut app).await;

    let ready = app.task_attachment.ready().expect("photo ready");
    assert_eq!((ready.width, ready.height), (60, 30));
}
