//! Browser tests for the generated viewer script: keyboard navigation with
//! wraparound, the swap toggle, and the gallery lightbox.
//!
//! These tests use headless Chrome over a local HTTP server so that the
//! root-relative links in the generated pages resolve.
//!
//! Run with: `cargo test --test browser_viewer -- --ignored`

use headless_chrome::{Browser, LaunchOptions, Tab};
use std::io::{Read as _, Write as _};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

// ===========================================================================
// Minimal static file server
// ===========================================================================

struct TestServer {
    port: u16,
    _stop: std::sync::mpsc::Sender<()>,
}

impl TestServer {
    fn start(root: PathBuf) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = std::sync::mpsc::channel::<()>();

        thread::spawn(move || {
            listener.set_nonblocking(true).unwrap();
            loop {
                if rx.try_recv().is_ok() {
                    break;
                }
                match listener.accept() {
                    Ok((stream, _)) => {
                        let root = root.clone();
                        thread::spawn(move || serve_request(stream, &root));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Self { port, _stop: tx }
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }
}

fn serve_request(mut stream: std::net::TcpStream, root: &Path) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 4096];
    let n = match stream.read(&mut buf) {
        Ok(n) if n > 0 => n,
        _ => return,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let path = request.split_whitespace().nth(1).unwrap_or("/");
    let path = path.split('?').next().unwrap_or(path);
    let rel = urlencoding::decode(path.trim_start_matches('/'))
        .map(|s| s.into_owned())
        .unwrap_or_default();
    let mut file_path = root.join(rel);
    if file_path.is_dir() {
        file_path = file_path.join("index.html");
    }

    let (status, body, ct) = if file_path.is_file() {
        let body = std::fs::read(&file_path).unwrap_or_default();
        let ext = file_path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let ct = match ext {
            "html" => "text/html; charset=utf-8",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            "avif" => "image/avif",
            _ => "application/octet-stream",
        };
        ("200 OK", body, ct)
    } else {
        ("404 Not Found", b"Not Found".to_vec(), "text/plain")
    };

    let header = format!(
        "HTTP/1.1 {status}\r\n\
         Content-Type: {ct}\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n",
        body.len()
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(&body);
}

// ===========================================================================
// Setup helpers
// ===========================================================================

fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 180, 160]))
        .save(path)
        .unwrap();
}

/// Build the fixture site once per test binary. Three kitchen pairs in the
/// Main Gallery, and a "Baths" set whose gallery holds three images.
fn generated_dir() -> &'static Path {
    static SITE: OnceLock<TempDir> = OnceLock::new();
    SITE.get_or_init(|| {
        let tmp = TempDir::new().unwrap();
        let content = tmp.path().join("content");
        for i in 1..=3 {
            write_png(&content.join(format!("kitchen_{i}_before.png")), 80, 60);
            write_png(&content.join(format!("kitchen_{i}_after.png")), 80, 60);
        }
        write_png(&content.join("Baths/tub_1_before.png"), 80, 60);
        write_png(&content.join("Baths/tub_1_after.png"), 80, 60);
        write_png(&content.join("Baths/mirror.png"), 60, 80);
        write_png(&content.join("Baths/tiles.png"), 60, 60);

        let status = Command::new(env!("CARGO_BIN_EXE_pair-gal"))
            .arg("build")
            .arg("--source")
            .arg(&content)
            .arg("--output")
            .arg(tmp.path().join("dist"))
            .arg("--temp-dir")
            .arg(tmp.path().join("temp"))
            .status()
            .expect("failed to run pair-gal");
        assert!(status.success(), "fixture generation failed");
        tmp
    })
    .path()
}

fn browser() -> &'static Browser {
    static B: OnceLock<Browser> = OnceLock::new();
    B.get_or_init(|| {
        Browser::new(LaunchOptions {
            window_size: Some((1280, 800)),
            ..Default::default()
        })
        .expect("failed to launch Chrome")
    })
}

fn start_server() -> TestServer {
    TestServer::start(generated_dir().join("dist"))
}

fn open(server: &TestServer, path: &str) -> Arc<Tab> {
    let tab = browser().new_tab().unwrap();
    tab.navigate_to(&server.url(path))
        .unwrap()
        .wait_until_navigated()
        .unwrap();
    tab
}

fn eval_string(tab: &Tab, expr: &str) -> String {
    tab.evaluate(expr, false)
        .unwrap()
        .value
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn eval_bool(tab: &Tab, expr: &str) -> bool {
    tab.evaluate(expr, false)
        .unwrap()
        .value
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

fn press(tab: &Tab, key: &str) {
    tab.press_key(key).unwrap();
    thread::sleep(Duration::from_millis(100));
}

fn press_and_navigate(tab: &Tab, key: &str) {
    tab.press_key(key).unwrap();
    thread::sleep(Duration::from_millis(200));
    tab.wait_until_navigated().unwrap();
}

// ===========================================================================
// Comparison pages
// ===========================================================================

#[test]
#[ignore]
fn arrow_right_on_last_pair_wraps_to_first() {
    let server = start_server();
    let tab = open(&server, "/sliders/main/3.html");

    press_and_navigate(&tab, "ArrowRight");
    assert!(tab.get_url().ends_with("/sliders/main/1.html"), "{}", tab.get_url());
}

#[test]
#[ignore]
fn arrow_left_on_first_pair_wraps_to_last() {
    let server = start_server();
    let tab = open(&server, "/sliders/main/1.html");

    press_and_navigate(&tab, "ArrowLeft");
    assert!(tab.get_url().ends_with("/sliders/main/3.html"), "{}", tab.get_url());
}

#[test]
#[ignore]
fn escape_returns_to_set_page() {
    let server = start_server();
    let tab = open(&server, "/sliders/main/2.html");

    press_and_navigate(&tab, "Escape");
    assert!(tab.get_url().ends_with("/sliders/main/"), "{}", tab.get_url());
}

#[test]
#[ignore]
fn swap_toggle_exchanges_sides() {
    let server = start_server();
    let tab = open(&server, "/sliders/main/1.html");

    let left = "document.querySelector('.compare-left').getAttribute('src')";
    assert!(eval_string(&tab, left).ends_with("kitchen_1_before.png"));

    tab.wait_for_element(".swap-toggle").unwrap().click().unwrap();
    thread::sleep(Duration::from_millis(100));
    assert!(eval_string(&tab, left).ends_with("kitchen_1_after.png"));
    assert_eq!(
        eval_string(&tab, "document.querySelector('.compare-label-left').textContent"),
        "After"
    );
}

#[test]
#[ignore]
fn range_input_moves_divider() {
    let server = start_server();
    let tab = open(&server, "/sliders/main/1.html");

    tab.evaluate(
        r#"(() => {
            const range = document.querySelector('.compare-range');
            range.value = 20;
            range.dispatchEvent(new Event('input'));
        })()"#,
        false,
    )
    .unwrap();
    assert_eq!(
        eval_string(
            &tab,
            "document.querySelector('.compare').style.getPropertyValue('--position')"
        ),
        "20%"
    );
}

// ===========================================================================
// Gallery lightbox
// ===========================================================================

const LIGHTBOX_HIDDEN: &str = "document.querySelector('[data-lightbox]').hidden";
const COUNTER: &str = "document.querySelector('.lightbox-counter').textContent";
const OVERFLOW: &str = "document.body.style.overflow";

#[test]
#[ignore]
fn keys_ignored_while_lightbox_closed() {
    let server = start_server();
    let tab = open(&server, "/gallery/");

    press(&tab, "ArrowRight");
    press(&tab, "Escape");
    assert!(eval_bool(&tab, LIGHTBOX_HIDDEN));
    assert_eq!(eval_string(&tab, OVERFLOW), "");
}

#[test]
#[ignore]
fn lightbox_wraps_and_restores_scroll() {
    let server = start_server();
    let tab = open(&server, "/gallery/");

    tab.wait_for_element("[data-gallery-item]")
        .unwrap()
        .click()
        .unwrap();
    thread::sleep(Duration::from_millis(100));
    assert!(!eval_bool(&tab, LIGHTBOX_HIDDEN));
    assert_eq!(eval_string(&tab, OVERFLOW), "hidden");
    assert_eq!(eval_string(&tab, COUNTER), "1 / 3");

    press(&tab, "ArrowLeft");
    assert_eq!(eval_string(&tab, COUNTER), "3 / 3");
    press(&tab, "ArrowRight");
    assert_eq!(eval_string(&tab, COUNTER), "1 / 3");

    press(&tab, "Escape");
    assert!(eval_bool(&tab, LIGHTBOX_HIDDEN));
    assert_eq!(eval_string(&tab, OVERFLOW), "");
}

#[test]
#[ignore]
fn lightbox_shows_comparison_for_paired_image() {
    let server = start_server();
    let tab = open(&server, "/gallery/");

    let paired = r#"(() => {
        const item = [...document.querySelectorAll('[data-gallery-item]')]
            .find((el) => el.dataset.before);
        item.click();
        return !!document.querySelector('.lightbox-stage [data-compare]');
    })()"#;
    assert!(eval_bool(&tab, paired));
}
