/// Dashboard home: stats strip and the category management panel.
///
/// Categories are an unpaginated collection; the panel offers create and
/// edit with an inline form (the API models no category removal).
use iced::widget::{button, column, container, horizontal_rule, row, scrollable, text, text_input};
use iced::{Alignment, Element, Length, Task};

use crate::api::types::Category;
use crate::api::{Api, ApiError, CategoryPayload};
use crate::screens::Action;
use crate::state::form::{date_input, FormState, Outcome};
use crate::ui;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
    pub who_edited: String,
}

#[derive(Debug, Default)]
pub struct Home {
    categories: Vec<Category>,
    loading: bool,
    error: Option<String>,
    form: FormState<CategoryDraft>,
}

#[derive(Debug, Clone)]
pub enum Message {
    Fetched(Result<Vec<Category>, ApiError>),
    NewPressed,
    EditPressed(Category),
    CancelPressed,
    NameChanged(String),
    DescriptionChanged(String),
    EditorChanged(String),
    SubmitPressed,
    Submitted(Result<(), ApiError>),
}

impl Home {
    pub fn new(api: &Api) -> (Self, Task<Message>) {
        let screen = Home {
            loading: true,
            ..Home::default()
        };
        (screen, fetch(api))
    }

    pub fn update(&mut self, message: Message, api: &Api) -> Action<Message> {
        match message {
            Message::Fetched(Ok(categories)) => {
                self.categories = categories;
                self.loading = false;
                self.error = None;
                Action::None
            }
            Message::Fetched(Err(ApiError::Unauthorized)) => Action::SessionExpired,
            Message::Fetched(Err(err)) => {
                self.loading = false;
                self.error = Some(err.user_message());
                Action::None
            }
            Message::NewPressed => {
                self.form.open_create();
                Action::None
            }
            Message::EditPressed(category) => {
                let draft = CategoryDraft {
                    name: category.category_name.clone(),
                    description: category.category_description.clone(),
                    who_edited: category.who_edited.clone().unwrap_or_default(),
                };
                self.form.open_edit(category.id, draft);
                Action::None
            }
            Message::CancelPressed => {
                self.form.close();
                Action::None
            }
            Message::NameChanged(value) => {
                self.form.draft.name = value;
                Action::None
            }
            Message::DescriptionChanged(value) => {
                self.form.draft.description = value;
                Action::None
            }
            Message::EditorChanged(value) => {
                self.form.draft.who_edited = value;
                Action::None
            }
            Message::SubmitPressed => {
                if self.form.busy {
                    return Action::None;
                }
                self.form.submit();
                let payload = payload_from(&self.form.draft);
                let api = api.clone();
                let task = match self.form.editing {
                    Some(id) => Task::perform(
                        async move { api.update_category(id, &payload).await },
                        Message::Submitted,
                    ),
                    None => Task::perform(
                        async move { api.create_category(&payload).await },
                        Message::Submitted,
                    ),
                };
                Action::Run(task)
            }
            Message::Submitted(result) => match self.form.finish(result) {
                Outcome::Saved => Action::Run(fetch(api)),
                Outcome::Expired => Action::SessionExpired,
                Outcome::Rejected => Action::None,
            },
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let header = column![
            text("Dashboard").size(24),
            text("Welcome to your library management system")
                .size(14)
                .style(text::secondary),
        ]
        .spacing(4);

        let stats = row![
            stat_card("Total Books", "0"),
            stat_card("Available Books", "0"),
            stat_card("Active Borrowers", "0"),
            stat_card("Transactions", "0"),
        ]
        .spacing(16);

        let mut panel = column![row![
            text(format!("Categories ({})", self.categories.len())).size(18),
            iced::widget::Space::with_width(Length::Fill),
            button(text("Add Category").size(14)).on_press(Message::NewPressed),
        ]
        .align_y(Alignment::Center)]
        .spacing(12);

        if let Some(error) = &self.error {
            panel = panel.push(ui::error_banner(error));
        }
        if self.form.open {
            panel = panel.push(self.form_view());
        }

        if self.loading && self.categories.is_empty() {
            panel = panel.push(text("Loading categories...").size(14).style(text::secondary));
        } else if self.categories.is_empty() {
            panel = panel.push(text("No categories found").size(14).style(text::secondary));
        } else {
            for category in &self.categories {
                panel = panel.push(horizontal_rule(1));
                panel = panel.push(self.category_row(category));
            }
        }

        let content = column![
            header,
            stats,
            container(panel)
                .padding(16)
                .width(Length::Fill)
                .style(container::rounded_box),
        ]
        .spacing(24)
        .padding(24);

        scrollable(content).height(Length::Fill).into()
    }

    fn category_row<'a>(&'a self, category: &'a Category) -> Element<'a, Message> {
        let mut details = column![text(&category.category_name).size(15)].spacing(2);
        if !category.category_description.is_empty() {
            details = details.push(
                text(&category.category_description)
                    .size(13)
                    .style(text::secondary),
            );
        }
        let mut meta = format!("Created: {}", date_input(&category.created_at));
        if let Some(editor) = category.who_edited.as_deref().filter(|e| !e.is_empty()) {
            meta.push_str(&format!(" | Edited by: {editor}"));
        }
        details = details.push(text(meta).size(12).style(text::secondary));

        row![
            details,
            iced::widget::Space::with_width(Length::Fill),
            button(text("Edit").size(13))
                .style(button::secondary)
                .on_press(Message::EditPressed(category.clone())),
        ]
        .align_y(Alignment::Center)
        .into()
    }

    fn form_view(&self) -> Element<'_, Message> {
        let title = if self.form.is_editing() {
            "Edit Category"
        } else {
            "Create New Category"
        };

        let mut form = column![text(title).size(16)].spacing(12);
        if let Some(error) = &self.form.error {
            form = form.push(ui::error_banner(error));
        }

        let submit_label = if self.form.busy {
            "Saving..."
        } else if self.form.is_editing() {
            "Update Category"
        } else {
            "Create Category"
        };

        form = form
            .push(
                row![
                    ui::field(
                        "Category Name *",
                        text_input("Enter category name", &self.form.draft.name)
                            .on_input(Message::NameChanged)
                            .padding(8),
                    ),
                    ui::field(
                        "Edited By",
                        text_input("Enter editor name", &self.form.draft.who_edited)
                            .on_input(Message::EditorChanged)
                            .padding(8),
                    ),
                ]
                .spacing(12),
            )
            .push(ui::field(
                "Description",
                text_input("Enter category description", &self.form.draft.description)
                    .on_input(Message::DescriptionChanged)
                    .padding(8),
            ))
            .push(
                row![
                    button(text(submit_label).size(14))
                        .on_press_maybe((!self.form.busy).then_some(Message::SubmitPressed)),
                    button(text("Cancel").size(14))
                        .style(button::secondary)
                        .on_press(Message::CancelPressed),
                ]
                .spacing(8),
            );

        container(form)
            .padding(16)
            .width(Length::Fill)
            .style(container::bordered_box)
            .into()
    }
}

fn fetch(api: &Api) -> Task<Message> {
    let api = api.clone();
    Task::perform(async move { api.categories().await }, Message::Fetched)
}

/// The editor name falls back to "Admin" when left empty, matching what the
/// API expects for the audit column.
fn payload_from(draft: &CategoryDraft) -> CategoryPayload {
    CategoryPayload {
        category_name: draft.name.clone(),
        category_description: draft.description.clone(),
        who_edited: if draft.who_edited.is_empty() {
            "Admin".to_string()
        } else {
            draft.who_edited.clone()
        },
    }
}

fn stat_card<'a, M: 'a>(title: &'a str, value: &'a str) -> Element<'a, M> {
    container(
        column![
            text(title).size(13).style(text::secondary),
            text(value).size(24),
        ]
        .spacing(8),
    )
    .padding(16)
    .width(Length::Fill)
    .style(container::rounded_box)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_editor_defaults_to_admin() {
        let payload = payload_from(&CategoryDraft {
            name: "Fiction".to_string(),
            description: String::new(),
            who_edited: String::new(),
        });
        assert_eq!(payload.who_edited, "Admin");
    }

    #[test]
    fn explicit_editor_is_kept() {
        let payload = payload_from(&CategoryDraft {
            name: "Fiction".to_string(),
            description: String::new(),
            who_edited: "Morgan".to_string(),
        });
        assert_eq!(payload.who_edited, "Morgan");
    }
}
