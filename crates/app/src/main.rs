//! Headless page-curl demo: scripts a drag and release across a book and
//! logs what each frame would draw.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use book::{Book, BookConfig, TouchAction, TouchEvent, ViewMode};
use mesh::{PageProvider, PageSide, TexturePage};
use pagecurl_core::Color;
use renderer::{FrameBuilder, Pass};

const FRAME_TIME: Duration = Duration::from_millis(16);

/// Colored pages without images.
struct DemoProvider {
    count: usize,
}

impl PageProvider for DemoProvider {
    fn page_count(&self) -> usize {
        self.count
    }

    fn update_page(&mut self, page: &mut TexturePage, index: usize) {
        let shade = 255 - ((index * 40) % 200) as u8;
        page.set_color(Color::argb(0xFF, shade, shade, 0xFF), PageSide::Front);
        page.set_color(Color::argb(0xFF, 0xF0, 0xF0, 0xF0), PageSide::Back);
        page.set_texture(PageSide::Front, index, Some(index as u32), None);
    }
}

struct Args {
    config: Option<String>,
    splits: Option<usize>,
    view: Option<ViewMode>,
    size: (u32, u32),
    frames: u32,
    start_page: usize,
    pages: Option<String>,
    dump_obj: Option<String>,
}

fn parse_args() -> Args {
    let mut args = Args {
        config: None,
        splits: None,
        view: None,
        size: (1280, 720),
        frames: 30,
        start_page: 0,
        pages: None,
        dump_obj: None,
    };

    for arg in std::env::args().skip(1) {
        if let Some(v) = arg.strip_prefix("--config=") {
            args.config = Some(v.to_string());
        } else if let Some(v) = arg.strip_prefix("--splits=") {
            match v.parse::<usize>() {
                Ok(n) => args.splits = Some(n),
                Err(_) => log::warn!("Ignoring bad --splits value '{}'", v),
            }
        } else if let Some(v) = arg.strip_prefix("--view=") {
            args.view = match v.to_ascii_lowercase().as_str() {
                "one" | "1" => Some(ViewMode::One),
                "two" | "2" => Some(ViewMode::Two),
                other => {
                    log::warn!("Unknown view mode '{}', keeping config value.", other);
                    None
                }
            };
        } else if let Some(v) = arg.strip_prefix("--size=") {
            if let Some((sw, sh)) = v.split_once('x').or_else(|| v.split_once('X')) {
                if let (Ok(w), Ok(h)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                    args.size = (w.max(1), h.max(1));
                }
            }
        } else if let Some(v) = arg.strip_prefix("--frames=") {
            if let Ok(n) = v.parse::<u32>() {
                args.frames = n.max(1);
            }
        } else if let Some(v) = arg.strip_prefix("--start-page=") {
            if let Ok(n) = v.parse::<usize>() {
                args.start_page = n;
            }
        } else if let Some(v) = arg.strip_prefix("--pages=") {
            args.pages = Some(v.to_string());
        } else if let Some(v) = arg.strip_prefix("--dump-obj=") {
            args.dump_obj = Some(v.to_string());
        } else {
            log::warn!("Unknown argument '{}'", arg);
        }
    }
    args
}

fn load_config(args: &Args) -> Result<BookConfig> {
    let mut config = match &args.config {
        Some(path) => BookConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path))?,
        None => BookConfig::default(),
    };
    if let Some(n) = args.splits {
        config.max_curl_splits = n;
    }
    if let Some(mode) = args.view {
        config.view_mode = mode;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    let config = load_config(&args)?;
    let (width, height) = args.size;
    log::info!(
        "Starting page curl demo. view={:?}, splits={}, surface={}x{}",
        config.view_mode,
        config.max_curl_splits,
        width,
        height
    );

    let mut book = Book::new(config);
    book.set_viewport(width, height);
    match &args.pages {
        Some(dir) => book.set_page_provider(Box::new(asset::DirectoryProvider::open(dir)?)),
        None => book.set_page_provider(Box::new(DemoProvider { count: 4 })),
    }
    book.jump_to(args.start_page)?;

    let mut frames = FrameBuilder::new(book.background());
    let mut now = Instant::now();
    let y = height as f64 / 2.0;
    let x_start = width as f64 * 0.98;
    let x_end = width as f64 * 0.05;

    if !book.on_touch(TouchEvent::new(TouchAction::Down, x_start, y)) {
        log::warn!("Drag did not start a curl; nothing to turn.");
        return Ok(());
    }

    let mid = args.frames / 2;
    for i in 1..=args.frames {
        let t = i as f64 / args.frames as f64;
        let x = x_start + (x_end - x_start) * t;
        let dy = (t * std::f64::consts::PI).sin() * height as f64 * 0.1;
        book.on_touch(TouchEvent::new(TouchAction::Move, x, y - dy));
        log_frame(&mut frames, &book, i);

        if i == mid {
            if let Some(path) = &args.dump_obj {
                book.curl_mesh()
                    .draw(|draw| asset::save_obj(path, &draw))?;
            }
        }
    }

    book.on_touch(TouchEvent::new(TouchAction::Up, x_end, y));
    let mut frame_no = args.frames;
    while book.is_animating() {
        now += FRAME_TIME;
        frame_no += 1;
        book.on_frame(now.max(Instant::now()));
        log_frame(&mut frames, &book, frame_no);
    }

    log::info!(
        "Turn complete: page {} of {}",
        book.current_index(),
        book.page_count()
    );
    log::info!("Graceful shutdown. Bye!");
    Ok(())
}

fn log_frame(frames: &mut FrameBuilder, book: &Book, n: u32) {
    let frame = frames.build(book.visible_meshes());
    let shadow_calls =
        frame.calls_for(Pass::DropShadow).count() + frame.calls_for(Pass::SelfShadow).count();
    log::debug!(
        "frame {:3}: {} calls ({} shadow), {} surface bytes, {} shadow bytes",
        n,
        frame.calls.len(),
        shadow_calls,
        frame.surface_bytes().len(),
        frame.shadow_bytes().len()
    );
}
