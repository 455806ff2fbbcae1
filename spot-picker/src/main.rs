use std::{
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use anyhow::{bail, Context};
use clap::Parser;
use nalgebra::Vector2;
use occupancy::overlay;
use opencv::{
    highgui::{self, EVENT_LBUTTONDOWN, EVENT_MBUTTONDOWN, EVENT_RBUTTONDOWN},
    imgcodecs::{self, IMREAD_COLOR},
    prelude::*,
};
use spots::{
    editor::{key_without_modifiers, ClickKind, EditKey, EditorController, MouseClick},
    RegionStore,
};

const WINDOW: &str = "Parking Selector";

#[derive(Parser, Debug)]
#[command(name = "spot-picker", about = "Annotate parking spaces on a still of the lot")]
struct Args {
    /// Still image the regions are drawn on
    #[arg(long, value_name = "PATH", default_value = "carPark.jpg")]
    image: PathBuf,
    #[arg(long, value_name = "PATH", default_value = "CarParkPos")]
    regions: PathBuf,
}

type ClickQueue = Arc<Mutex<Vec<MouseClick>>>;

fn main() -> anyhow::Result<()> {
    setup_logging();
    let args = Args::parse();

    let image_path = args.image.to_str().context("Image path is not valid UTF-8")?;
    let reference = imgcodecs::imread(image_path, IMREAD_COLOR)?;
    if reference.empty() {
        bail!("Could not load image from {image_path}");
    }
    log::info!("Loaded {image_path} ({}x{})", reference.cols(), reference.rows());

    let mut controller = EditorController::open(RegionStore::new(&args.regions));

    highgui::named_window(WINDOW, highgui::WINDOW_AUTOSIZE)?;
    let clicks: ClickQueue = Arc::default();
    {
        let clicks = clicks.clone();
        highgui::set_mouse_callback(WINDOW, Some(Box::new(move |event, x, y, _flags| {
            if let Some(kind) = click_kind(event) {
                lock(&clicks).push(MouseClick::new(kind, Vector2::new(x, y)));
            }
        })))?;
    }

    log::info!("Left click adds, right click removes, middle click selects, q quits");
    loop {
        let pending: Vec<MouseClick> = lock(&clicks).drain(..).collect();
        for click in &pending {
            controller.handle_click(click);
        }

        let mut img = reference.clone();
        let editor = controller.editor();
        overlay::draw_annotations(&mut img, editor.regions(), editor.selected())?;
        highgui::imshow(WINDOW, &img)?;

        let key = highgui::wait_key_ex(1)?;
        if is_quit(key) {
            break;
        }
        if let Some(edit) = EditKey::from_key_code(key) {
            controller.handle_key(edit);
        }
    }

    highgui::destroy_all_windows()?;
    Ok(())
}

fn click_kind(event: i32) -> Option<ClickKind> {
    match event {
        EVENT_LBUTTONDOWN => Some(ClickKind::Add),
        EVENT_RBUTTONDOWN => Some(ClickKind::Remove),
        EVENT_MBUTTONDOWN => Some(ClickKind::Select),
        _ => None,
    }
}

fn is_quit(key: i32) -> bool {
    key_without_modifiers(key) == 'q' as i32
}

fn lock(clicks: &ClickQueue) -> MutexGuard<'_, Vec<MouseClick>> {
    clicks.lock().unwrap_or_else(PoisonError::into_inner)
}

fn setup_logging() {
    simple_log::quick!();
}
