use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use iced::widget::{button, column, container, image, row, scrollable, text};
use iced::{event, keyboard, window, Element, Length, Subscription, Task, Theme};
use rand::rngs::StdRng;
use rand::SeedableRng;

use eyepong_core::pong::domain::draw::draw;
use eyepong_core::pong::domain::game_state::GameState;
use eyepong_core::pong::domain::input::{InputEvent, Key};
use eyepong_core::pong::infrastructure::display_list::DisplayList;
use eyepong_core::shared::constants::IMAGE_EXTENSIONS;

use crate::settings::{Appearance, Settings};
use crate::tabs;
use crate::theme;
use crate::workers::annotate_worker::{self, AnnotateParams, WorkerMessage};
use crate::workers::cascade_cache::CascadeCache;

// ---------------------------------------------------------------------------
// Tab enum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    EyeTracking,
    Pong,
    About,
}

impl Tab {
    const ALL: &[Tab] = &[Tab::EyeTracking, Tab::Pong, Tab::About];

    fn label(self) -> &'static str {
        match self {
            Tab::EyeTracking => "Eye Tracking",
            Tab::Pong => "Ping Pong",
            Tab::About => "About",
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    SelectInput,
    InputSelected(Option<PathBuf>),
    SelectOutput,
    OutputSelected(Option<PathBuf>),
    OpacityChanged(u32),
    FaceNeighborsChanged(u32),
    EyeNeighborsChanged(u32),
    RunAnnotate,
    CancelAnnotate,
    PollWorker,
    PongTick,
    PongInput(InputEvent),
    NewGame,
    AppearanceChanged(Appearance),
    FontScaleChanged(f32),
    PollSystemTheme,
}

#[derive(Debug, Clone)]
pub enum ProcessingState {
    Idle,
    Preparing,
    Downloading(u64, u64),
    Annotating,
    /// Output path and a preview decoded from its bytes at completion time.
    Complete(PathBuf, Option<image::Handle>),
    Error(String),
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    active_tab: Tab,
    settings: Settings,
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    processing: ProcessingState,
    worker: Option<(Receiver<WorkerMessage>, Arc<AtomicBool>)>,
    cascade_cache: Arc<CascadeCache>,
    game: GameState,
    rng: StdRng,
    court: DisplayList,
    space_held: bool,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let mut rng = StdRng::from_entropy();
        let game = GameState::new(&mut rng);
        let mut app = Self {
            active_tab: Tab::EyeTracking,
            settings: Settings::load(),
            input_path: None,
            output_path: None,
            processing: ProcessingState::Idle,
            worker: None,
            cascade_cache: CascadeCache::new(),
            game,
            rng,
            court: DisplayList::new(),
            space_held: false,
        };
        app.redraw_court();
        (app, Task::none())
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                // Key releases are not delivered once the court is hidden
                if self.active_tab == Tab::Pong && tab != Tab::Pong {
                    release_held_keys(&mut self.game);
                    self.space_held = false;
                }
                self.active_tab = tab;
            }
            Message::SelectInput => {
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .set_title("Select an image")
                            .add_filter("Images", IMAGE_EXTENSIONS)
                            .pick_file()
                            .await
                            .map(|h| h.path().to_path_buf())
                    },
                    Message::InputSelected,
                );
            }
            Message::InputSelected(Some(path)) => {
                self.output_path = Some(default_output_path(&path));
                self.input_path = Some(path);
                self.processing = ProcessingState::Idle;
            }
            Message::InputSelected(None) => {}
            Message::SelectOutput => {
                let start_dir = self
                    .output_path
                    .as_ref()
                    .and_then(|p| p.parent().map(|d| d.to_path_buf()));
                let start_name = self
                    .output_path
                    .as_ref()
                    .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()));
                return Task::perform(
                    async move {
                        let mut dialog = rfd::AsyncFileDialog::new()
                            .set_title("Save highlighted image as")
                            .add_filter("Images", IMAGE_EXTENSIONS);
                        if let Some(dir) = start_dir {
                            dialog = dialog.set_directory(dir);
                        }
                        if let Some(name) = start_name {
                            dialog = dialog.set_file_name(name);
                        }
                        dialog.save_file().await.map(|h| h.path().to_path_buf())
                    },
                    Message::OutputSelected,
                );
            }
            Message::OutputSelected(Some(path)) => {
                self.output_path = Some(path);
            }
            Message::OutputSelected(None) => {}
            Message::OpacityChanged(value) => {
                self.settings.opacity = value;
                self.settings.save();
            }
            Message::FaceNeighborsChanged(value) => {
                self.settings.face_min_neighbors = value;
                self.settings.save();
            }
            Message::EyeNeighborsChanged(value) => {
                self.settings.eye_min_neighbors = value;
                self.settings.save();
            }
            Message::RunAnnotate => self.start_annotation(),
            Message::CancelAnnotate => {
                if let Some((_, cancelled)) = &self.worker {
                    cancelled.store(true, Ordering::Relaxed);
                }
            }
            Message::PollWorker => self.poll_worker(),
            Message::PongTick => {
                self.game.update(&mut self.rng);
                self.redraw_court();
            }
            Message::PongInput(event) => self.forward_pong_input(event),
            Message::NewGame => {
                self.game = GameState::new(&mut self.rng);
                self.space_held = false;
                self.redraw_court();
            }
            Message::AppearanceChanged(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::FontScaleChanged(scale) => {
                self.settings.font_scale = scale;
                self.settings.save();
            }
            Message::PollSystemTheme => {}
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let fs = self.settings.font_scale;
        let theme = self.theme();

        let tab_bar = row(Tab::ALL
            .iter()
            .map(|&tab| {
                let label = text(tab.label()).size(scaled(13.0, fs));
                let btn = button(label)
                    .on_press(Message::TabSelected(tab))
                    .padding([6, 14]);
                if tab == self.active_tab {
                    btn.style(button::primary).into()
                } else {
                    btn.style(button::text).into()
                }
            })
            .collect::<Vec<_>>())
        .spacing(2);

        let content: Element<'_, Message> = match self.active_tab {
            Tab::EyeTracking => tabs::eye_tracking_tab::view(
                &self.settings,
                self.input_path.as_deref(),
                self.output_path.as_deref(),
                &self.processing,
                &theme,
            ),
            Tab::Pong => tabs::pong_tab::view(fs, &self.court),
            Tab::About => tabs::about_tab::view(&self.settings),
        };

        let tab_content = container(scrollable(content).height(Length::Fill))
            .padding(16)
            .height(Length::Fill);

        column![tab_bar, tab_content]
            .spacing(0)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = Vec::new();
        if self.settings.appearance == Appearance::System {
            subscriptions
                .push(iced::time::every(Duration::from_secs(2)).map(|_| Message::PollSystemTheme));
        }
        if self.worker.is_some() {
            subscriptions
                .push(iced::time::every(Duration::from_millis(50)).map(|_| Message::PollWorker));
        }
        if self.active_tab == Tab::Pong {
            subscriptions.push(window::frames().map(|_| Message::PongTick));
            subscriptions.push(event::listen_with(pong_key_event));
        }
        Subscription::batch(subscriptions)
    }

    fn start_annotation(&mut self) {
        let (Some(input), Some(output)) = (self.input_path.clone(), self.output_path.clone())
        else {
            return;
        };
        if self.worker.is_some() {
            return;
        }
        log::info!("Highlighting eyes in {}", input.display());
        self.processing = ProcessingState::Preparing;
        self.worker = Some(annotate_worker::spawn(AnnotateParams {
            input_path: input,
            output_path: output,
            face_params: self.settings.face_params(),
            eye_params: self.settings.eye_params(),
            style: self.settings.highlight_style(),
            cascade_cache: self.cascade_cache.clone(),
        }));
    }

    fn poll_worker(&mut self) {
        let Some((rx, _)) = &self.worker else {
            return;
        };
        let mut finished = false;
        while let Ok(message) = rx.try_recv() {
            match message {
                WorkerMessage::DownloadProgress(downloaded, total) => {
                    self.processing = ProcessingState::Downloading(downloaded, total);
                }
                WorkerMessage::Annotating => {
                    self.processing = ProcessingState::Annotating;
                }
                WorkerMessage::Complete(path) => {
                    let preview = load_preview(&path);
                    self.processing = ProcessingState::Complete(path, preview);
                    finished = true;
                }
                WorkerMessage::Error(e) => {
                    self.processing = ProcessingState::Error(e);
                    finished = true;
                }
                WorkerMessage::Cancelled => {
                    self.processing = ProcessingState::Idle;
                    finished = true;
                }
            }
        }
        if finished {
            self.worker = None;
        }
    }

    fn forward_pong_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(Key::Space) if self.space_held => return,
            InputEvent::KeyDown(Key::Space) => self.space_held = true,
            InputEvent::KeyUp(Key::Space) => self.space_held = false,
            _ => {}
        }
        self.game.handle_input(event);
    }

    fn redraw_court(&mut self) {
        self.court.clear();
        draw(&self.game, &mut self.court);
    }
}

/// Scale a base font size by the user's font_scale setting.
pub fn scaled(base: f32, font_scale: f32) -> f32 {
    (base * font_scale).round()
}

fn default_output_path(input: &std::path::Path) -> PathBuf {
    let stem = input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let ext = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_eyes{ext}"))
}

fn pong_key_event(event: iced::Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    let iced::Event::Keyboard(event) = event else {
        return None;
    };
    match event {
        keyboard::Event::KeyPressed { key, .. } => {
            Some(Message::PongInput(InputEvent::KeyDown(to_game_key(&key))))
        }
        keyboard::Event::KeyReleased { key, .. } => {
            Some(Message::PongInput(InputEvent::KeyUp(to_game_key(&key))))
        }
        _ => None,
    }
}

/// Reads the output file now so a re-run to the same path is not served
/// from the image cache.
fn load_preview(path: &std::path::Path) -> Option<image::Handle> {
    match std::fs::read(path) {
        Ok(bytes) => Some(image::Handle::from_bytes(bytes)),
        Err(e) => {
            log::warn!("Could not load preview {}: {e}", path.display());
            None
        }
    }
}

fn release_held_keys(game: &mut GameState) {
    for key in [Key::ArrowLeft, Key::ArrowRight] {
        game.handle_input(InputEvent::KeyUp(key));
    }
}

fn to_game_key(key: &keyboard::Key) -> Key {
    match key {
        keyboard::Key::Named(keyboard::key::Named::ArrowLeft) => Key::ArrowLeft,
        keyboard::Key::Named(keyboard::key::Named::ArrowRight) => Key::ArrowRight,
        keyboard::Key::Named(keyboard::key::Named::Space) => Key::Space,
        _ => Key::Other,
    }
}
