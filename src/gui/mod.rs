mod app;
mod overlays;
mod screens;
mod widgets;

pub use app::launch_gui;
