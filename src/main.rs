mod chat;
mod config;
mod error;
mod logging;
mod modes;
mod ollama;
mod onboarding;
mod theme;
mod timer;

use iced::{
    alignment, time,
    widget::{
        button, column, container, row, scrollable, text, text_input, text_input::Id, Space,
    },
    window, Element, Font, Length, Size, Subscription, Task, Theme,
};
use notify_rust::Notification;
use std::sync::Arc;
use std::time::Duration;

use chat::ChatLog;
use config::Settings;
use modes::{CommandBrowser, ModeSet};
use ollama::OllamaClient;
use onboarding::Onboarding;
use timer::{FocusTimer, TimerEvent};

fn main() -> anyhow::Result<()> {
    logging::init()?;

    iced::application("focusdeck", App::update, App::view)
        .theme(App::theme)
        .subscription(App::subscription)
        .window(window::Settings {
            size: Size::new(900.0, 560.0),
            min_size: Some(Size::new(600.0, 400.0)),
            position: window::Position::Centered,
            ..Default::default()
        })
        .default_font(Font::MONOSPACE)
        .run_with(App::new)?;

    Ok(())
}

#[derive(Debug, Clone)]
enum Message {
    // Chat sidebar
    ChatInputChanged(String),
    ChatSubmit,
    ChatReply(String),
    ChatFailed(String),
    // Focus burst
    StartFocusBurst,
    TimerTick,
    // Launcher
    LaunchMode(String),
    SwitchTheme(&'static str),
    // Settings view
    OpenSettings,
    DraftBrowserChanged(String),
    DraftEndpointChanged(String),
    DraftModelChanged(String),
    SaveSettings,
    // Mode editor
    OpenModeEditor,
    DraftModeNameChanged(String),
    DraftModeUrlsChanged(String),
    SaveMode,
    EditMode(String),
    DeleteMode(String),
    ClosePanel,
    // Onboarding + startup
    OnboardingAdvance,
    OnboardingSkip,
    OllamaStatus(Result<(), String>),
}

enum Screen {
    Onboarding(Onboarding),
    Main,
}

#[derive(Debug, Clone, Default)]
struct SettingsDraft {
    browser_command: String,
    endpoint: String,
    model: String,
}

impl From<&Settings> for SettingsDraft {
    fn from(settings: &Settings) -> Self {
        SettingsDraft {
            browser_command: settings.browser_command.clone(),
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct ModeDraft {
    name: String,
    urls: String,
}

/// Which view occupies the left panel.
enum Panel {
    Launcher,
    Settings(SettingsDraft),
    ModeEditor(ModeDraft),
}

struct App {
    screen: Screen,
    panel: Panel,
    settings: Settings,
    modes: ModeSet,
    focus: FocusTimer,
    theme_name: &'static str,
    chat: ChatLog,
    chat_input: String,
    chat_busy: bool,
    status: Option<String>,
    client: Arc<OllamaClient>,
    input_id: Id,
}

impl App {
    fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        let mut status = None;

        let modes = match ModeSet::load() {
            Ok(modes) => modes,
            Err(e) => {
                log::error!("{}", e);
                status = Some(e.to_string());
                ModeSet::default()
            }
        };

        let client = Arc::new(OllamaClient::with_config(
            settings.endpoint.clone(),
            settings.model.clone(),
        ));

        let screen = if onboarding::is_complete() {
            Screen::Main
        } else {
            Screen::Onboarding(Onboarding::default())
        };

        let input_id = Id::unique();

        let app = App {
            screen,
            panel: Panel::Launcher,
            settings,
            modes,
            focus: FocusTimer::default(),
            theme_name: theme::DEFAULT_THEME,
            chat: ChatLog::default(),
            chat_input: String::new(),
            chat_busy: false,
            status,
            client: client.clone(),
            input_id: input_id.clone(),
        };

        // Probe Ollama in the background; a failure only shows a banner.
        let probe = Task::future(async move {
            Message::OllamaStatus(client.check_available().await.map_err(|e| e.to_string()))
        });

        (app, Task::batch([probe, text_input::focus(input_id)]))
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ChatInputChanged(value) => {
                self.chat_input = value;
                Task::none()
            }
            Message::ChatSubmit => {
                let prompt = self.chat_input.trim().to_string();
                if prompt.is_empty() || self.chat_busy {
                    return Task::none();
                }
                self.chat.push_user(prompt.clone());
                self.chat_input.clear();
                self.chat_busy = true;

                let client = self.client.clone();
                Task::future(async move {
                    match client.chat(&prompt).await {
                        Ok(reply) => Message::ChatReply(reply),
                        Err(e) => Message::ChatFailed(e.to_string()),
                    }
                })
            }
            Message::ChatReply(reply) => {
                self.chat.push_assistant(reply);
                self.chat_busy = false;
                Task::none()
            }
            Message::ChatFailed(error) => {
                log::error!("{}", error);
                self.chat.push_error(error);
                self.chat_busy = false;
                Task::none()
            }
            Message::StartFocusBurst => {
                if self.focus.start() {
                    log::info!("focus burst started");
                }
                Task::none()
            }
            Message::TimerTick => {
                if self.focus.tick() == TimerEvent::Completed {
                    log::info!("focus burst complete");
                    self.status = Some(
                        "Focus burst complete! Time for a break or the next burst.".to_string(),
                    );
                    if let Err(e) = Notification::new()
                        .summary("Focus burst complete")
                        .body("5 minutes of super focus is up.")
                        .show()
                    {
                        log::warn!("desktop notification failed: {}", e);
                    }
                }
                Task::none()
            }
            Message::LaunchMode(name) => {
                if self.focus.is_running() {
                    self.status = Some("Finish your focus burst first.".to_string());
                    return Task::none();
                }
                if let Some(mode) = self.modes.get(&name) {
                    let browser = CommandBrowser::new(self.settings.browser_command.clone());
                    match modes::launch(mode, &browser) {
                        Ok(count) => {
                            log::info!("opened {} tabs for '{}'", count, name);
                            self.status = None;
                        }
                        Err(e) => {
                            log::error!("{}", e);
                            self.status = Some(e.to_string());
                        }
                    }
                }
                Task::none()
            }
            Message::SwitchTheme(name) => {
                self.theme_name = name;
                Task::none()
            }
            Message::OpenSettings => {
                self.panel = Panel::Settings(SettingsDraft::from(&self.settings));
                Task::none()
            }
            Message::DraftBrowserChanged(value) => {
                if let Panel::Settings(draft) = &mut self.panel {
                    draft.browser_command = value;
                }
                Task::none()
            }
            Message::DraftEndpointChanged(value) => {
                if let Panel::Settings(draft) = &mut self.panel {
                    draft.endpoint = value;
                }
                Task::none()
            }
            Message::DraftModelChanged(value) => {
                if let Panel::Settings(draft) = &mut self.panel {
                    draft.model = value;
                }
                Task::none()
            }
            Message::SaveSettings => {
                if let Panel::Settings(draft) = &self.panel {
                    self.settings = Settings {
                        browser_command: draft.browser_command.trim().to_string(),
                        endpoint: draft.endpoint.trim().to_string(),
                        model: draft.model.trim().to_string(),
                    };
                    match self.settings.save() {
                        Ok(()) => {
                            log::info!("settings saved");
                            self.status = None;
                        }
                        Err(e) => {
                            log::error!("{}", e);
                            self.status = Some(e.to_string());
                        }
                    }
                    self.client = Arc::new(OllamaClient::with_config(
                        self.settings.endpoint.clone(),
                        self.settings.model.clone(),
                    ));
                    self.panel = Panel::Launcher;
                }
                Task::none()
            }
            Message::OpenModeEditor => {
                self.panel = Panel::ModeEditor(ModeDraft::default());
                Task::none()
            }
            Message::DraftModeNameChanged(value) => {
                if let Panel::ModeEditor(draft) = &mut self.panel {
                    draft.name = value;
                }
                Task::none()
            }
            Message::DraftModeUrlsChanged(value) => {
                if let Panel::ModeEditor(draft) = &mut self.panel {
                    draft.urls = value;
                }
                Task::none()
            }
            Message::SaveMode => {
                if let Panel::ModeEditor(draft) = &self.panel {
                    let name = draft.name.trim().to_string();
                    let urls: Vec<String> = draft
                        .urls
                        .split(',')
                        .map(|u| u.trim().to_string())
                        .filter(|u| !u.is_empty())
                        .collect();
                    if name.is_empty() || urls.is_empty() {
                        self.status = Some("A mode needs a name and at least one URL.".to_string());
                        return Task::none();
                    }
                    self.modes.upsert(&name, urls);
                    self.persist_modes();
                    self.panel = Panel::ModeEditor(ModeDraft::default());
                }
                Task::none()
            }
            Message::EditMode(name) => {
                if let Some(mode) = self.modes.get(&name) {
                    self.panel = Panel::ModeEditor(ModeDraft {
                        name: mode.name.clone(),
                        urls: mode.urls.join(", "),
                    });
                }
                Task::none()
            }
            Message::DeleteMode(name) => {
                if self.modes.remove(&name) {
                    self.persist_modes();
                }
                Task::none()
            }
            Message::ClosePanel => {
                self.panel = Panel::Launcher;
                Task::none()
            }
            Message::OnboardingAdvance => {
                if let Screen::Onboarding(flow) = &mut self.screen {
                    if flow.advance() {
                        return self.finish_onboarding();
                    }
                }
                Task::none()
            }
            Message::OnboardingSkip => self.finish_onboarding(),
            Message::OllamaStatus(Ok(())) => {
                log::info!("Ollama reachable, model '{}' available", self.client.model());
                Task::none()
            }
            Message::OllamaStatus(Err(msg)) => {
                log::warn!("{}", msg);
                self.status = Some(format!("AI chat may not work: {}", msg));
                Task::none()
            }
        }
    }

    fn finish_onboarding(&mut self) -> Task<Message> {
        if let Err(e) = onboarding::mark_complete() {
            log::warn!("{}", e);
        }
        self.screen = Screen::Main;
        text_input::focus(self.input_id.clone())
    }

    fn persist_modes(&mut self) {
        match self.modes.save() {
            Ok(()) => self.status = None,
            Err(e) => {
                log::error!("{}", e);
                self.status = Some(e.to_string());
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.focus.is_running() {
            time::every(Duration::from_secs(1)).map(|_| Message::TimerTick)
        } else {
            Subscription::none()
        }
    }

    fn view(&self) -> Element<Message> {
        match &self.screen {
            Screen::Onboarding(flow) => self.view_onboarding(flow),
            Screen::Main => self.view_main(),
        }
    }

    fn view_onboarding(&self, flow: &Onboarding) -> Element<Message> {
        let screen = flow.current();

        let content = column![
            text(screen.title).size(28).color(theme::user_color()),
            text(screen.body).size(16),
            row![
                button(text(screen.action).size(15)).on_press(Message::OnboardingAdvance),
                button(text("Skip for now").size(15)).on_press(Message::OnboardingSkip),
            ]
            .spacing(15),
        ]
        .spacing(25)
        .align_x(alignment::Horizontal::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(alignment::Horizontal::Center)
            .align_y(alignment::Vertical::Center)
            .into()
    }

    fn view_main(&self) -> Element<Message> {
        let left: Element<Message> = match &self.panel {
            Panel::Launcher => self.view_launcher(),
            Panel::Settings(draft) => self.view_settings(draft),
            Panel::ModeEditor(draft) => self.view_mode_editor(draft),
        };

        row![
            container(left)
                .width(Length::FillPortion(3))
                .height(Length::Fill)
                .padding(15),
            container(self.view_sidebar())
                .width(Length::FillPortion(2))
                .height(Length::Fill)
                .padding(15),
        ]
        .into()
    }

    fn view_launcher(&self) -> Element<Message> {
        let mut content = column![text("focusdeck: Mode Launcher").size(24)].spacing(10);

        if let Some(status) = &self.status {
            content = content.push(text(status.as_str()).size(14).color(theme::error_color()));
        }

        for mode in self.modes.iter() {
            let mut launch = button(text(mode.name.as_str()).size(15))
                .width(Length::Fill)
                .padding(10);
            // Mode launching is off while a burst is running.
            if !self.focus.is_running() {
                launch = launch.on_press(Message::LaunchMode(mode.name.clone()));
            }
            content = content.push(launch);
        }

        content = content.push(
            row![
                button(text("Edit Modes").size(14)).on_press(Message::OpenModeEditor),
                button(text("Settings").size(14)).on_press(Message::OpenSettings),
            ]
            .spacing(10),
        );

        content = content.push(Space::with_height(Length::Fill));

        let mut focus_button = button(text("Start 5-Minute Super Focus Burst").size(15))
            .width(Length::Fill)
            .padding(10);
        if !self.focus.is_running() {
            focus_button = focus_button.on_press(Message::StartFocusBurst);
        }
        content = content.push(focus_button);

        if self.focus.is_running() {
            content = content.push(
                container(text(format!("Focus Time Left: {}", self.focus.display())).size(22))
                    .width(Length::Fill)
                    .align_x(alignment::Horizontal::Center),
            );
        }

        content = content.push(text("Switch Theme:").size(14));
        let mut themes = row![].spacing(10);
        for name in theme::names() {
            themes = themes.push(button(text(name).size(13)).on_press(Message::SwitchTheme(name)));
        }
        content = content.push(themes);

        content.into()
    }

    fn view_settings(&self, draft: &SettingsDraft) -> Element<Message> {
        column![
            text("Settings").size(24),
            text("Browser Command:").size(14),
            text_input("google-chrome", &draft.browser_command)
                .on_input(Message::DraftBrowserChanged)
                .padding(10),
            text("Ollama API URL:").size(14),
            text_input("http://localhost:11434/api/chat", &draft.endpoint)
                .on_input(Message::DraftEndpointChanged)
                .padding(10),
            text("Ollama Model Name:").size(14),
            text_input("llama2", &draft.model)
                .on_input(Message::DraftModelChanged)
                .padding(10),
            row![
                button(text("Save").size(14)).on_press(Message::SaveSettings),
                button(text("Cancel").size(14)).on_press(Message::ClosePanel),
            ]
            .spacing(10),
        ]
        .spacing(10)
        .into()
    }

    fn view_mode_editor(&self, draft: &ModeDraft) -> Element<Message> {
        let mut content = column![
            text("Edit Modes").size(24),
            text_input("Mode name", &draft.name)
                .on_input(Message::DraftModeNameChanged)
                .padding(10),
            text_input("Comma-separated URLs", &draft.urls)
                .on_input(Message::DraftModeUrlsChanged)
                .on_submit(Message::SaveMode)
                .padding(10),
            row![
                button(text("Save Mode").size(14)).on_press(Message::SaveMode),
                button(text("Back").size(14)).on_press(Message::ClosePanel),
            ]
            .spacing(10),
        ]
        .spacing(10);

        for mode in self.modes.iter() {
            content = content.push(
                row![
                    text(format!("{}: {}", mode.name, mode.urls.join(", ")))
                        .size(13)
                        .width(Length::Fill),
                    button(text("edit").size(13)).on_press(Message::EditMode(mode.name.clone())),
                    button(text("delete").size(13))
                        .on_press(Message::DeleteMode(mode.name.clone())),
                ]
                .spacing(10)
                .align_y(alignment::Vertical::Center),
            );
        }

        scrollable(content).height(Length::Fill).into()
    }

    fn view_sidebar(&self) -> Element<Message> {
        let mut history = column![].spacing(12).padding(5);

        if self.chat.is_empty() {
            history = history.push(text("Ask the deck anything...").size(14));
        }

        for message in self.chat.iter() {
            let color = if message.is_error {
                theme::error_color()
            } else {
                match message.sender {
                    chat::Sender::User => theme::user_color(),
                    chat::Sender::Assistant => theme::assistant_color(),
                }
            };
            history = history.push(column![
                text(format!(
                    "{} · {}",
                    message.sender.label(),
                    message.timestamp.format("%H:%M")
                ))
                .size(12)
                .color(color),
                text(message.text.as_str()).size(15),
            ]);
        }

        if self.chat_busy {
            history = history.push(
                text("Thinking...")
                    .size(14)
                    .color(theme::assistant_color()),
            );
        }

        let input = text_input("Ask focusdeck...", &self.chat_input)
            .on_input(Message::ChatInputChanged)
            .on_submit(Message::ChatSubmit)
            .padding(10)
            .id(self.input_id.clone());

        let mut send = button(text("Send").size(14)).padding(10);
        if !self.chat_busy {
            send = send.on_press(Message::ChatSubmit);
        }

        column![
            text("Chat Assistant").size(18),
            scrollable(history).height(Length::Fill),
            row![input, send].spacing(10),
        ]
        .spacing(10)
        .into()
    }

    fn theme(&self) -> Theme {
        theme::theme(self.theme_name)
    }
}
