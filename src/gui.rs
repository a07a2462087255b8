use iced::widget::{rule, Button, Column, Container, PickList, Row, Space, Text, TextInput};
use iced::{clipboard, Border, Color, Element, Length, Task};

use futures::channel::mpsc;
use hashutil::config::AppConfig;
use hashutil::utils;
use hashutil::{
    verify, Algorithm, DigestEngine, DigestResult, HashJob, JobHandle, JobId, JobOutcome,
    Verdict,
};
use rfd::FileDialog;
use std::path::PathBuf;

/// Events forwarded from a job's worker thread into the UI loop.
#[derive(Debug, Clone)]
pub enum JobEvent {
    Progress(bool),
    Completed(JobOutcome),
}

#[derive(Debug, Clone)]
pub enum Message {
    ChooseFile,
    FileChosen(Option<PathBuf>),
    AlgorithmSelected(Algorithm),
    Refresh,
    Cancel,
    Job(JobId, JobEvent),
    ReferenceChanged(String),
    CheckClipboard,
    ClipboardRead(Option<String>),
    LoadHashFile,
    HashFileLoaded(Option<String>),
    Check,
    CopyDigest,
    Exit,
}

pub struct HashUtilApp {
    engine: DigestEngine,
    chosen_file: Option<PathBuf>,
    algorithm: Algorithm,
    reference: String,
    status_message: String,
    busy: bool,
    current_job: Option<JobHandle>,
    last_result: Option<DigestResult>,
    verdict: Option<Verdict>,
}

impl HashUtilApp {
    pub fn new(config: AppConfig) -> (Self, Task<Message>) {
        let algorithm = if Algorithm::SUPPORTED.contains(&config.default_algorithm) {
            config.default_algorithm
        } else {
            Algorithm::SUPPORTED[0]
        };
        (
            HashUtilApp {
                engine: DigestEngine::new().with_block_size(config.block_size),
                chosen_file: None,
                algorithm,
                reference: String::new(),
                status_message: String::new(),
                busy: false,
                current_job: None,
                last_result: None,
                verdict: None,
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ChooseFile => {
                return Task::perform(
                    async { FileDialog::new().set_directory(".").pick_file() },
                    Message::FileChosen,
                );
            }
            Message::FileChosen(Some(path)) => {
                self.chosen_file = Some(path);
                return self.start_job();
            }
            Message::FileChosen(None) => { /* cancelled */ }
            Message::AlgorithmSelected(a) => {
                self.algorithm = a;
                if self.chosen_file.is_some() {
                    return self.start_job();
                }
            }
            Message::Refresh => return self.start_job(),
            Message::Cancel => {
                if let Some(job) = &self.current_job {
                    job.cancel();
                }
            }
            Message::Exit => {
                if let Some(job) = self.current_job.take() {
                    tracing::info!(job = %job.id(), "cancelling job on exit");
                    job.cancel();
                }
                self.busy = false;
                return iced::exit();
            }
            Message::Job(id, event) => {
                if self.current_job.as_ref().map(JobHandle::id) != Some(id) {
                    tracing::debug!(job = %id, "ignoring event from superseded job");
                    return Task::none();
                }
                self.on_job_event(event);
            }
            Message::ReferenceChanged(s) => {
                self.reference = s;
                self.verdict = None;
            }
            Message::CheckClipboard => {
                return clipboard::read().map(Message::ClipboardRead);
            }
            Message::ClipboardRead(text) => {
                self.reference = text
                    .as_deref()
                    .and_then(utils::parse_first_hash_from_text)
                    .unwrap_or_default();
                self.check();
            }
            Message::LoadHashFile => {
                return Task::perform(
                    async {
                        FileDialog::new()
                            .set_directory(".")
                            .add_filter("checksum", &["txt", "hash", "md5", "sha1", "sha256", "sha512"])
                            .pick_file()
                    },
                    |res| Message::HashFileLoaded(res.and_then(|p| std::fs::read_to_string(p).ok())),
                );
            }
            Message::HashFileLoaded(opt) => {
                if let Some(h) = opt.as_deref().and_then(utils::parse_first_hash_from_text) {
                    self.reference = h;
                    self.verdict = None;
                }
            }
            Message::Check => self.check(),
            Message::CopyDigest => {
                if let Some(res) = &self.last_result {
                    return clipboard::write(res.hex_digest().to_string());
                }
            }
        }
        Task::none()
    }

    /// Replace any running job with a fresh one for the current file and
    /// algorithm, and subscribe to its events.
    fn start_job(&mut self) -> Task<Message> {
        let Some(path) = self.chosen_file.clone() else {
            return Task::none();
        };
        if let Some(previous) = self.current_job.take() {
            previous.cancel();
        }
        self.last_result = None;
        self.verdict = None;
        self.busy = false;

        let job = HashJob::new(&self.engine, path, self.algorithm);
        let id = job.id();
        let (tx, rx) = mpsc::unbounded();
        let progress_tx = tx.clone();
        let started = job.start(
            move |outcome: JobOutcome| {
                let _ = tx.unbounded_send(JobEvent::Completed(outcome));
            },
            move |active: bool| {
                let _ = progress_tx.unbounded_send(JobEvent::Progress(active));
            },
        );

        match started {
            Ok(handle) => {
                tracing::info!(job = %id, algorithm = %self.algorithm, "started hashing");
                self.status_message = "Computing hash...".to_string();
                self.current_job = Some(handle);
                Task::run(rx, move |event| Message::Job(id, event))
            }
            Err(e) => {
                tracing::error!("could not spawn hash worker: {e}");
                self.status_message = format!("Error: could not start worker: {e}");
                Task::none()
            }
        }
    }

    fn on_job_event(&mut self, event: JobEvent) {
        match event {
            JobEvent::Progress(active) => self.busy = active,
            JobEvent::Completed(outcome) => {
                self.current_job = None;
                match outcome {
                    Ok(res) => {
                        self.status_message = format!("{} of {}", res.algorithm(), res.file_name());
                        self.last_result = Some(res);
                    }
                    Err(e) if e.is_configuration() => {
                        self.status_message = format!("Configuration error: {e}");
                    }
                    Err(e) => {
                        self.status_message = format!("Error: {e}");
                    }
                }
            }
        }
    }

    fn check(&mut self) {
        self.verdict = self
            .last_result
            .as_ref()
            .map(|res| verify(res, &self.reference));
        if self.verdict.is_none() {
            self.status_message = "No hash has been computed yet.".to_string();
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let layout = Row::new()
            .push(self.view_sidebar())
            .push(rule::Rule::vertical(1))
            .push(self.view_main());

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| iced::widget::container::Style {
                background: Some(iced::Background::Color(Color::WHITE)),
                border: Border::default(),
                ..Default::default()
            })
            .into()
    }

    fn view_sidebar(&self) -> Element<'_, Message> {
        let accent = accent_color();

        let title = Text::new("HashUtil")
            .size(28)
            .style(move |_theme| iced::widget::text::Style {
                color: Some(accent),
            });

        let subtitle = Text::new("File Checksum Calculator").size(14).style(secondary_text);

        let algo_picker = PickList::new(
            Algorithm::SUPPORTED,
            Some(self.algorithm),
            Message::AlgorithmSelected,
        )
        .padding(10)
        .width(Length::Fill);

        let select_btn = Button::new(Text::new("Select File").size(14))
            .on_press(Message::ChooseFile)
            .padding(10)
            .width(Length::Fill);

        let refresh_btn = Button::new(Text::new("Refresh").size(14))
            .on_press_maybe(self.chosen_file.as_ref().map(|_| Message::Refresh))
            .padding(10)
            .width(Length::Fill);

        let cancel_btn = Button::new(Text::new("Cancel").size(14))
            .on_press_maybe(self.current_job.as_ref().map(|_| Message::Cancel))
            .padding(10)
            .width(Length::Fill);

        let exit_btn = Button::new(Text::new("Exit").size(14))
            .on_press(Message::Exit)
            .padding(10)
            .width(Length::Fill);

        let content = Column::new()
            .padding(20)
            .spacing(16)
            .width(Length::Fixed(260.0))
            .push(title)
            .push(subtitle)
            .push(rule::Rule::horizontal(1))
            .push(Text::new("Hash Algorithm").size(16))
            .push(algo_picker)
            .push(Text::new(self.algorithm.description()).size(12).style(secondary_text))
            .push(Space::with_height(10))
            .push(select_btn)
            .push(refresh_btn)
            .push(cancel_btn)
            .push(Space::with_height(Length::Fill))
            .push(exit_btn);

        Container::new(content)
            .height(Length::Fill)
            .style(|_theme| iced::widget::container::Style {
                background: Some(iced::Background::Color(Color::from_rgb(0.95, 0.95, 0.97))),
                border: Border::default(),
                ..Default::default()
            })
            .into()
    }

    fn view_main(&self) -> Element<'_, Message> {
        let file_text = match &self.chosen_file {
            Some(path) => path.display().to_string(),
            None => "No file selected".to_string(),
        };

        let busy = if self.busy {
            Text::new("⟳ Working...").size(16).style(move |_theme| iced::widget::text::Style {
                color: Some(accent_color()),
            })
        } else {
            Text::new(&self.status_message).size(16).style(secondary_text)
        };

        let digest = self
            .last_result
            .as_ref()
            .map(|r| r.hex_digest())
            .unwrap_or("");

        let copy_btn = Button::new(Text::new("Copy to Clipboard").size(14))
            .on_press_maybe(self.last_result.as_ref().map(|_| Message::CopyDigest))
            .padding(10);

        let reference_input = TextInput::new("Paste reference hash here", &self.reference)
            .on_input(Message::ReferenceChanged)
            .on_submit(Message::Check)
            .padding(12)
            .size(14)
            .width(Length::Fill);

        let reference_buttons = Row::new()
            .spacing(12)
            .push(Button::new(Text::new("Check").size(14)).on_press(Message::Check).padding(10))
            .push(
                Button::new(Text::new("Check Clipboard").size(14))
                    .on_press(Message::CheckClipboard)
                    .padding(10),
            )
            .push(
                Button::new(Text::new("Load Hash File").size(14))
                    .on_press(Message::LoadHashFile)
                    .padding(10),
            );

        let mut content = Column::new()
            .padding(30)
            .spacing(18)
            .width(Length::Fill)
            .push(labeled("File:", Text::new(file_text).size(16).into()))
            .push(busy)
            .push(labeled("Hash:", boxed(Text::new(digest).size(14).into())))
            .push(copy_btn)
            .push(Space::with_height(10))
            .push(rule::Rule::horizontal(1))
            .push(labeled("Reference:", reference_input.into()))
            .push(reference_buttons);

        if let Some(verdict) = self.verdict {
            let (msg, color) = verdict_message(verdict);
            content = content.push(Text::new(msg).size(16).style(move |_theme| {
                iced::widget::text::Style { color: Some(color) }
            }));
        }

        Container::new(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn labeled<'a>(label: &'a str, body: Element<'a, Message>) -> Element<'a, Message> {
    Column::new()
        .spacing(5)
        .push(Text::new(label).size(14).style(secondary_text))
        .push(body)
        .into()
}

fn boxed(body: Element<'_, Message>) -> Element<'_, Message> {
    Container::new(body)
        .padding(10)
        .width(Length::Fill)
        .style(|_theme| iced::widget::container::Style {
            background: Some(iced::Background::Color(Color::from_rgb(0.95, 0.95, 0.95))),
            border: Border {
                color: Color::from_rgb(0.8, 0.8, 0.8),
                width: 1.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        })
        .into()
}

fn verdict_message(verdict: Verdict) -> (&'static str, Color) {
    match verdict {
        Verdict::Match => ("✓ The checksum matches.", Color::from_rgb(0.2, 0.7, 0.2)),
        Verdict::Mismatch => (
            "✗ The checksum does not match. Did you copy the right hash and select the right algorithm?",
            Color::from_rgb(0.9, 0.2, 0.2),
        ),
        Verdict::NoReference => (
            "There is no reference hash to check against.",
            Color::from_rgb(0.5, 0.5, 0.5),
        ),
    }
}

fn secondary_text(_theme: &iced::Theme) -> iced::widget::text::Style {
    iced::widget::text::Style {
        color: Some(Color::from_rgb(0.4, 0.4, 0.4)),
    }
}

fn accent_color() -> Color {
    Color::from_rgb(0.2, 0.5, 0.8)
}
