use crate::agent::registry::SessionRegistry;
use crate::agent::Role;
use crate::event::{AgentReply, AppEvent};
use crate::ids::now_millis;
use crate::store::automations::AutomationStatus;
use crate::store::runs::RunStatus;
use crate::theme::Theme;
use crate::view::{Action, Feature, ReplyOutcome, ViewState};
use chrono::{DateTime, Local};
use eframe::egui::{self, Align, Layout, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use tokio::runtime::Handle;

const WORKSPACE_FEATURES: [Feature; 3] = [Feature::Files, Feature::Automations, Feature::Runs];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThemeChoice {
    Dark,
    Light,
    HighContrast,
}

impl ThemeChoice {
    const ALL: [ThemeChoice; 3] = [Self::Dark, Self::Light, Self::HighContrast];

    fn label(self) -> &'static str {
        match self {
            Self::Dark => "Dark (Default)",
            Self::Light => "Light",
            Self::HighContrast => "High Contrast",
        }
    }
}

/// Sidebar connection form. Values stay local to the window.
#[derive(Debug, Default)]
struct ConnectionSetup {
    url: String,
    llm_endpoint: String,
    warehouse_id: String,
}

pub struct WorkbenchApp {
    rx: Receiver<AppEvent>,
    tx: Sender<AppEvent>,
    registry: Arc<SessionRegistry>,
    runtime_handle: Handle,
    view: ViewState,
    theme: Theme,
    model: String,
    setup: ConnectionSetup,
    theme_choice: ThemeChoice,
    telemetry_enabled: bool,
    diagnostics_log: Vec<String>,
    scroll_to_bottom: bool,
}

impl WorkbenchApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        tx: Sender<AppEvent>,
        registry: Arc<SessionRegistry>,
        runtime_handle: Handle,
        model: String,
        theme: Theme,
    ) -> Self {
        Self {
            rx,
            tx,
            registry,
            runtime_handle,
            view: ViewState::sample(now_millis()),
            theme,
            model,
            setup: ConnectionSetup::default(),
            theme_choice: ThemeChoice::Dark,
            telemetry_enabled: true,
            diagnostics_log: Vec::new(),
            scroll_to_bottom: false,
        }
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log.push(format!(
            "[{}] {}",
            Local::now().format("%H:%M:%S"),
            message.into()
        ));
    }

    fn submit_prompt(&mut self, ctx: &egui::Context) {
        let Some(outbound) = self.view.begin_send(now_millis()) else {
            return;
        };

        let registry = Arc::clone(&self.registry);
        let tx = self.tx.clone();
        let repaint_ctx = ctx.clone();
        self.runtime_handle.spawn(async move {
            let text = registry
                .send(&outbound.conversation_id, &outbound.text)
                .await;
            let _ = tx.send(AppEvent::AgentReply(AgentReply {
                request_id: outbound.request_id,
                conversation_id: outbound.conversation_id,
                text,
            }));
            repaint_ctx.request_repaint();
        });

        self.scroll_to_bottom = true;
        ctx.request_repaint();
    }

    fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::AgentReply(reply) => {
                let conversation_id = reply.conversation_id.clone();
                match self.view.complete_send(reply, now_millis()) {
                    ReplyOutcome::Applied => {
                        if let Some(handle) = self.registry.handle_of(&conversation_id) {
                            self.log_diagnostic(format!("reply received on session {handle}"));
                        }
                        self.scroll_to_bottom = true;
                    }
                    ReplyOutcome::Stale => self.log_diagnostic(format!(
                        "dropped reply for conversation {conversation_id}"
                    )),
                }
            }
        }
    }

    fn apply_actions(&mut self, actions: Vec<Action>) {
        for action in actions {
            self.view.apply(action, now_millis());
        }
    }

    fn render_top_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar")
            .frame(self.theme.panel_frame(self.theme.header_bg, 6))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Workspace").color(self.theme.text_primary));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(
                            RichText::new(format!(
                                "{} · {} session(s)",
                                self.model,
                                self.registry.len()
                            ))
                            .small()
                            .color(self.theme.text_muted),
                        );
                    });
                });
            });
    }

    fn render_chat_sidebar(&mut self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        egui::SidePanel::left("chat_sidebar")
            .exact_width(300.0)
            .resizable(false)
            .frame(self.theme.panel_frame(self.theme.sidebar_bg, 0))
            .show(ctx, |ui| {
                if self.view.current_chat_id().is_some() {
                    self.render_chat(ui, actions);
                } else {
                    self.render_setup(ui, actions);
                }
            });
    }

    fn render_section_header(&self, ui: &mut egui::Ui, title: &str) {
        self.theme.section_header_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                RichText::new(title.to_uppercase())
                    .strong()
                    .small()
                    .color(self.theme.text_primary),
            );
        });
    }

    fn render_setup(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        self.render_section_header(ui, "Databricks Setup");

        let mut token_requested = false;
        egui::Frame::new()
            .inner_margin(egui::Margin::same(self.theme.spacing_16 as i8))
            .show(ui, |ui| {
                ui.label(
                    RichText::new(
                        "Configure your Databricks connection to enable agent capabilities.",
                    )
                    .small()
                    .color(self.theme.text_muted),
                );
                ui.add_space(self.theme.spacing_8);

                for (label, hint, value) in [
                    (
                        "Databricks URL",
                        "https://adb-1234.5.azuredatabricks.net",
                        &mut self.setup.url,
                    ),
                    (
                        "Databricks LLM Endpoint",
                        "databricks-meta-llama-3-70b-instruct",
                        &mut self.setup.llm_endpoint,
                    ),
                    ("SQL Warehouse ID", "1234567890abcdef", &mut self.setup.warehouse_id),
                ] {
                    ui.label(RichText::new(label).small());
                    ui.add(
                        egui::TextEdit::singleline(value)
                            .hint_text(hint)
                            .desired_width(f32::INFINITY),
                    );
                    ui.add_space(self.theme.spacing_4);
                }

                let token_button = self.theme.filled_button("🔑 Set Databricks Token", self.theme.button_bg);
                if ui
                    .add_sized([ui.available_width(), 28.0], token_button)
                    .clicked()
                {
                    token_requested = true;
                }

                ui.add_space(self.theme.spacing_16);
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Recent Chats").strong());
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui.small_button("＋ New Chat").clicked() {
                            actions.push(Action::NewChat);
                        }
                    });
                });
                ScrollArea::vertical()
                    .id_salt("recent_chats")
                    .max_height(220.0)
                    .show(ui, |ui| {
                        for conversation in self.view.conversations().all() {
                            let marker = if self.registry.contains(&conversation.id) {
                                "● "
                            } else {
                                ""
                            };
                            let label = format!(
                                "{marker}{}\n{}",
                                conversation.title,
                                if conversation.last_message.is_empty() {
                                    "No messages yet"
                                } else {
                                    conversation.last_message.as_str()
                                }
                            );
                            let response = ui.add_sized(
                                [ui.available_width(), 36.0],
                                egui::Button::new(RichText::new(label).small())
                                    .fill(self.theme.sidebar_bg),
                            );
                            if response.clicked() {
                                actions.push(Action::SelectChat(Some(conversation.id.clone())));
                            }
                        }
                    });
            });

        if token_requested {
            self.log_diagnostic("token configuration is not available in this build");
        }

        ui.with_layout(Layout::bottom_up(Align::Center), |ui| {
            egui::Frame::new()
                .fill(self.theme.editor_bg)
                .inner_margin(egui::Margin::same(self.theme.spacing_16 as i8))
                .show(ui, |ui| {
                    let button = self
                        .theme
                        .filled_button("🗀 Open Workspace", self.theme.workspace_button_bg);
                    if ui.add_sized([ui.available_width(), 32.0], button).clicked() {
                        actions.push(Action::OpenWorkspace);
                    }
                });
        });
    }

    fn render_chat(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        self.theme.section_header_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                if ui
                    .small_button("⬅")
                    .on_hover_text("Back to History")
                    .clicked()
                {
                    actions.push(Action::SelectChat(None));
                }
                ui.label(RichText::new("AGENT CHAT").strong().small());
            });
        });

        let transcript_height = (ui.available_height() - 150.0).max(120.0);
        egui::Frame::new()
            .inner_margin(egui::Margin::same(self.theme.spacing_12 as i8))
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("chat_transcript")
                    .max_height(transcript_height)
                    .stick_to_bottom(true)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        if self.view.messages().is_empty() {
                            ui.add_space(40.0);
                            ui.vertical_centered(|ui| {
                                ui.label(
                                    RichText::new("Start a conversation with the agent.")
                                        .color(self.theme.text_muted),
                                );
                            });
                        }

                        for message in self.view.messages() {
                            let from_user = message.role == Role::User;
                            let layout = if from_user {
                                Layout::top_down(Align::Max)
                            } else {
                                Layout::top_down(Align::Min)
                            };
                            ui.with_layout(layout, |ui| {
                                ui.set_max_width(ui.available_width() * 0.85);
                                self.theme.bubble_frame(from_user).show(ui, |ui| {
                                    let color = if from_user {
                                        self.theme.text_bright
                                    } else {
                                        self.theme.text_primary
                                    };
                                    ui.label(RichText::new(&message.text).color(color));
                                });
                            });
                        }

                        if self.view.is_waiting_for_reply() {
                            self.theme.bubble_frame(false).show(ui, |ui| {
                                ui.label(
                                    RichText::new("Thinking...")
                                        .italics()
                                        .color(self.theme.text_muted),
                                );
                            });
                        }

                        if self.scroll_to_bottom {
                            ui.scroll_to_cursor(Some(Align::BOTTOM));
                        }
                    });
            });
        self.scroll_to_bottom = false;

        egui::CollapsingHeader::new("Diagnostics")
            .default_open(false)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("diagnostics_log")
                    .max_height(80.0)
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for entry in &self.diagnostics_log {
                            ui.label(RichText::new(entry).small().monospace());
                        }
                    });
            });

        let mut send_now = false;
        egui::Frame::new()
            .fill(self.theme.editor_bg)
            .inner_margin(egui::Margin::same(self.theme.spacing_12 as i8))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let hint = if self.view.is_waiting_for_reply() {
                        "Waiting for response..."
                    } else {
                        "Ask anything..."
                    };
                    let response = ui.add(
                        egui::TextEdit::singleline(self.view.input_mut())
                            .hint_text(hint)
                            .desired_width(ui.available_width() - 40.0),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        send_now = true;
                    }

                    let can_send = self.view.can_send();
                    send_now |= ui
                        .add_enabled(can_send, egui::Button::new("➤"))
                        .clicked();
                });
            });

        if send_now {
            let ctx = ui.ctx().clone();
            self.submit_prompt(&ctx);
        }
    }

    fn render_activity_bar(&self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        egui::SidePanel::left("activity_bar")
            .exact_width(192.0)
            .resizable(false)
            .frame(self.theme.panel_frame(self.theme.activity_bar_bg, 0))
            .show(ctx, |ui| {
                ui.add_space(self.theme.spacing_8);
                ui.horizontal(|ui| {
                    ui.add_space(self.theme.spacing_16);
                    ui.label(
                        RichText::new("EXPLORER")
                            .small()
                            .strong()
                            .color(self.theme.text_muted),
                    );
                });

                for feature in WORKSPACE_FEATURES {
                    self.render_feature_item(ui, feature, actions);
                }

                ui.with_layout(Layout::bottom_up(Align::Min), |ui| {
                    ui.add_space(self.theme.spacing_8);
                    self.render_feature_item(ui, Feature::Settings, actions);
                });
            });
    }

    fn render_feature_item(&self, ui: &mut egui::Ui, feature: Feature, actions: &mut Vec<Action>) {
        let icon = match feature {
            Feature::Files => "🗋",
            Feature::Automations => "🤖",
            Feature::Runs => "⚡",
            Feature::Settings => "⚙",
        };
        let selected = self.view.active_feature() == feature;
        let text = RichText::new(format!("{icon}  {}", feature.label())).color(if selected {
            self.theme.text_bright
        } else {
            self.theme.text_muted
        });
        let button = egui::Button::new(text)
            .fill(if selected {
                self.theme.list_active
            } else {
                self.theme.activity_bar_bg
            })
            .stroke(egui::Stroke::NONE)
            .min_size(egui::vec2(ui.available_width(), 30.0));
        if ui.add(button).clicked() {
            actions.push(Action::ChangeFeature(feature));
        }
    }

    fn render_workspace(&mut self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        egui::CentralPanel::default()
            .frame(self.theme.panel_frame(self.theme.editor_bg, 0))
            .show(ctx, |ui| match self.view.active_feature() {
                Feature::Files => self.render_files(ui, actions),
                Feature::Automations => self.render_automations(ui, actions),
                Feature::Runs => self.render_runs(ui, actions),
                Feature::Settings => self.render_settings(ui),
            });
    }

    fn render_files(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        egui::SidePanel::left("explorer")
            .exact_width(256.0)
            .resizable(false)
            .frame(self.theme.panel_frame(self.theme.sidebar_bg, 0))
            .show_inside(ui, |ui| {
                self.theme.section_header_frame().show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("EXPLORER").small().strong());
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            if ui
                                .small_button("＋")
                                .on_hover_text("Add Local Folder")
                                .clicked()
                            {
                                actions.push(Action::AddFolder);
                            }
                        });
                    });
                });

                ScrollArea::vertical().id_salt("file_tree").show(ui, |ui| {
                    ui.add_space(self.theme.spacing_8);
                    for row in self.view.files().visible_rows() {
                        ui.horizontal(|ui| {
                            ui.add_space(row.depth as f32 * self.theme.tree_indent + self.theme.spacing_8);
                            let label = if row.node.is_folder() {
                                let chevron = if row.node.is_open { "⏷" } else { "⏵" };
                                format!("{chevron} 🗀 {}", row.node.name)
                            } else {
                                format!("    🗋 {}", row.node.name)
                            };
                            let response = ui.add(
                                egui::Label::new(RichText::new(label).color(self.theme.text_primary))
                                    .truncate()
                                    .sense(egui::Sense::click()),
                            );
                            if response.clicked() && row.node.is_folder() {
                                actions.push(Action::ToggleFolder(row.node.id.clone()));
                            }
                        });
                    }
                });
            });

        ui.centered_and_justified(|ui| {
            ui.label(
                RichText::new("🗋\n\nSelect a file to view contents")
                    .color(self.theme.text_muted),
            );
        });
    }

    fn render_automations(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        egui::Frame::new()
            .inner_margin(egui::Margin::symmetric(24, 10))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(RichText::new("Automations").color(self.theme.text_bright));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let button = self.theme.filled_button("＋ New Automation", self.theme.accent);
                        if ui.add(button).clicked() {
                            actions.push(Action::NewAutomation);
                        }
                    });
                });
            });
        ui.separator();

        ScrollArea::vertical().id_salt("automations").show(ui, |ui| {
            egui::Frame::new()
                .inner_margin(egui::Margin::same(24))
                .show(ui, |ui| {
                    egui::Grid::new("automation_cards")
                        .num_columns(3)
                        .spacing([self.theme.spacing_16, self.theme.spacing_16])
                        .show(ui, |ui| {
                            for (index, automation) in self.view.automations().all().iter().enumerate() {
                                self.theme.card_frame().show(ui, |ui| {
                                    ui.set_width(240.0);
                                    ui.horizontal(|ui| {
                                        ui.label(
                                            RichText::new(format!("🤖 {}", automation.name))
                                                .strong()
                                                .color(self.theme.accent),
                                        );
                                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                            let color = match automation.status {
                                                AutomationStatus::Active => self.theme.success,
                                                AutomationStatus::Inactive => self.theme.text_muted,
                                            };
                                            ui.label(
                                                RichText::new(automation.status.as_str().to_uppercase())
                                                    .small()
                                                    .color(color),
                                            );
                                        });
                                    });
                                    ui.label(
                                        RichText::new(&automation.description)
                                            .small()
                                            .color(self.theme.text_muted),
                                    );
                                    ui.separator();
                                    ui.label(
                                        RichText::new(format_date(automation.created_at))
                                            .small()
                                            .color(self.theme.text_muted),
                                    );
                                });
                                if index % 3 == 2 {
                                    ui.end_row();
                                }
                            }
                        });
                });
        });
    }

    fn render_runs(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        let selected_id = self.view.selected_automation_for_runs();

        egui::SidePanel::left("runs_automation_list")
            .exact_width(256.0)
            .resizable(false)
            .frame(self.theme.panel_frame(self.theme.sidebar_bg, 0))
            .show_inside(ui, |ui| {
                self.render_section_header(ui, "Select Automation");
                ScrollArea::vertical().id_salt("runs_automations").show(ui, |ui| {
                    for automation in self.view.automations().all() {
                        let selected = selected_id == Some(automation.id.as_str());
                        let response = ui.add_sized(
                            [ui.available_width(), 32.0],
                            egui::SelectableLabel::new(selected, format!("🤖 {}", automation.name)),
                        );
                        if response.clicked() {
                            actions.push(Action::SelectAutomationForRuns(automation.id.clone()));
                        }
                    }
                });
            });

        let header = match (selected_id, self.view.selected_automation()) {
            (None, _) => "Select an automation to view runs".to_string(),
            (Some(_), Some(automation)) => format!("Run History for {}", automation.name),
            (Some(_), None) => "Run History for Unknown automation".to_string(),
        };
        self.theme.section_header_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(header).color(self.theme.text_primary));
        });

        if selected_id.is_none() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("⚡\n\nNo Automation Selected").color(self.theme.text_muted));
            });
            return;
        }

        let runs = self.view.selected_runs();
        if runs.is_empty() {
            ui.add_space(40.0);
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("No runs found.").color(self.theme.text_muted));
            });
            return;
        }

        egui::Frame::new()
            .inner_margin(egui::Margin::same(24))
            .show(ui, |ui| {
                egui::Grid::new("runs_table")
                    .num_columns(5)
                    .striped(true)
                    .spacing([32.0, 10.0])
                    .show(ui, |ui| {
                        for heading in ["Status", "Run ID", "Start Time", "Duration", "Actions"] {
                            ui.label(RichText::new(heading).small().color(self.theme.text_muted));
                        }
                        ui.end_row();

                        for run in runs {
                            let (icon, color) = match run.status {
                                RunStatus::Success => ("✔", self.theme.success),
                                RunStatus::Failed => ("✖", self.theme.danger),
                                RunStatus::Running => ("▶", self.theme.running),
                            };
                            ui.label(RichText::new(icon).color(color));
                            ui.label(RichText::new(&run.id).monospace());
                            ui.label(
                                RichText::new(format_date_time(run.start_time))
                                    .color(self.theme.text_muted),
                            );
                            ui.label(RichText::new(&run.duration).color(self.theme.text_muted));
                            ui.add_enabled(false, egui::Button::new("Logs").small());
                            ui.end_row();
                        }
                    });
            });
    }

    fn render_settings(&mut self, ui: &mut egui::Ui) {
        egui::Frame::new()
            .inner_margin(egui::Margin::same(32))
            .show(ui, |ui| {
                ui.heading("Settings");
                ui.add_space(self.theme.spacing_16);
                ui.set_max_width(420.0);

                ui.label("Theme");
                egui::ComboBox::from_id_salt("settings_theme")
                    .selected_text(self.theme_choice.label())
                    .width(ui.available_width())
                    .show_ui(ui, |ui| {
                        for choice in ThemeChoice::ALL {
                            ui.selectable_value(&mut self.theme_choice, choice, choice.label());
                        }
                    });

                ui.add_space(self.theme.spacing_12);
                ui.checkbox(&mut self.telemetry_enabled, "Enable Telemetry");
            });
    }
}

fn local_time(epoch_ms: i64) -> Option<DateTime<Local>> {
    DateTime::from_timestamp_millis(epoch_ms).map(|utc| utc.with_timezone(&Local))
}

fn format_date(epoch_ms: i64) -> String {
    local_time(epoch_ms)
        .map(|time| time.format("%x").to_string())
        .unwrap_or_default()
}

fn format_date_time(epoch_ms: i64) -> String {
    local_time(epoch_ms)
        .map(|time| time.format("%x %X").to_string())
        .unwrap_or_default()
}

impl eframe::App for WorkbenchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        let mut actions = Vec::new();
        self.render_top_bar(ctx);
        self.render_chat_sidebar(ctx, &mut actions);
        self.render_activity_bar(ctx, &mut actions);
        self.render_workspace(ctx, &mut actions);
        self.apply_actions(actions);
    }
}
