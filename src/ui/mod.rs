/// Shared presentational widgets.
///
/// Nothing in here owns business state; these helpers only render values
/// handed to them and map interactions back to the caller's messages.
use iced::widget::{
    button, center, column, container, mouse_area, opaque, pick_list, row, stack, text, Space,
};
use iced::{Alignment, Border, Color, Element, Length, Theme};

use crate::api::types::{BookStatus, Pagination, TxStatus};
use crate::state::list::PAGE_SIZES;

/// Float a dialog over the base view, dimming everything behind it.
/// Clicking the backdrop emits `on_dismiss`.
pub fn modal<'a, M: Clone + 'a>(
    base: impl Into<Element<'a, M>>,
    dialog: impl Into<Element<'a, M>>,
    on_dismiss: M,
) -> Element<'a, M> {
    let panel = container(dialog)
        .padding(24)
        .max_width(560)
        .style(container::rounded_box);

    let backdrop = center(opaque(panel)).style(|_theme: &Theme| container::Style {
        background: Some(
            Color {
                a: 0.6,
                ..Color::BLACK
            }
            .into(),
        ),
        ..container::Style::default()
    });

    stack![base.into(), opaque(mouse_area(backdrop).on_press(on_dismiss))].into()
}

pub fn error_banner<'a, M: 'a>(message: &'a str) -> Element<'a, M> {
    container(text(message).size(14).style(text::danger))
        .padding(10)
        .width(Length::Fill)
        .style(container::bordered_box)
        .into()
}

pub fn notice_banner<'a, M: 'a>(message: &'a str) -> Element<'a, M> {
    container(text(message).size(14))
        .padding(10)
        .width(Length::Fill)
        .style(container::bordered_box)
        .into()
}

/// Label + input pairing used by every dialog.
pub fn field<'a, M: 'a>(label: &'a str, input: impl Into<Element<'a, M>>) -> Element<'a, M> {
    column![text(label).size(13).style(text::secondary), input.into()]
        .spacing(4)
        .into()
}

/// Small colored status pill.
fn pill<'a, M: 'a>(label: &'static str, color: Color) -> Element<'a, M> {
    container(text(label).size(12).color(Color::WHITE))
        .padding([2.0, 8.0])
        .style(move |_theme: &Theme| container::Style {
            background: Some(color.into()),
            border: Border {
                radius: 8.0.into(),
                ..Border::default()
            },
            ..container::Style::default()
        })
        .into()
}

pub fn book_status_badge<'a, M: 'a>(status: BookStatus) -> Element<'a, M> {
    let (label, color) = match status {
        BookStatus::Available => ("Available", Color::from_rgb8(0x22, 0x8b, 0x4e)),
        BookStatus::Borrowed => ("Borrowed", Color::from_rgb8(0x2d, 0x6c, 0xdf)),
        BookStatus::Reserved => ("Reserved", Color::from_rgb8(0xc8, 0x7d, 0x1a)),
        BookStatus::Unavailable => ("Unavailable", Color::from_rgb8(0x6b, 0x72, 0x80)),
    };
    pill(label, color)
}

pub fn tx_status_badge<'a, M: 'a>(status: TxStatus) -> Element<'a, M> {
    let (label, color) = match status {
        TxStatus::Borrowed => ("Borrowed", Color::from_rgb8(0x2d, 0x6c, 0xdf)),
        TxStatus::Returned => ("Returned", Color::from_rgb8(0x22, 0x8b, 0x4e)),
        TxStatus::Overdue => ("Overdue", Color::from_rgb8(0xc0, 0x33, 0x2b)),
    };
    pill(label, color)
}

/// Pagination bar: page-size select, summary, and a five-page window with
/// prev/next. Buttons at the boundaries are disabled; the window itself is
/// produced by the list controller.
pub fn pagination_bar<'a, M: Clone + 'a>(
    pagination: &Pagination,
    page: u32,
    window: Vec<u32>,
    per_page: u32,
    on_page: impl Fn(u32) -> M + 'a,
    on_per_page: impl Fn(u32) -> M + 'a,
) -> Element<'a, M> {
    let summary = text(format!(
        "Page {} of {} ({} total)",
        page,
        pagination.last_page.max(1),
        pagination.total
    ))
    .size(14);

    let sizes = row![
        pick_list(PAGE_SIZES, Some(per_page), on_per_page).text_size(14),
        text("per page").size(14),
    ]
    .spacing(6)
    .align_y(Alignment::Center);

    let mut pages = row![].spacing(4).align_y(Alignment::Center);
    pages = pages.push(
        button(text("Prev").size(14))
            .style(button::secondary)
            .padding([4.0, 10.0])
            .on_press_maybe((page > 1).then(|| on_page(page - 1))),
    );
    for number in window {
        let style = if number == page {
            button::primary
        } else {
            button::secondary
        };
        pages = pages.push(
            button(text(number.to_string()).size(14))
                .style(style)
                .padding([4.0, 10.0])
                .on_press_maybe((number != page).then(|| on_page(number))),
        );
    }
    pages = pages.push(
        button(text("Next").size(14))
            .style(button::secondary)
            .padding([4.0, 10.0])
            .on_press_maybe((page < pagination.last_page).then(|| on_page(page + 1))),
    );

    row![summary, Space::with_width(Length::Fill), sizes, pages]
        .spacing(16)
        .align_y(Alignment::Center)
        .into()
}

/// Confirmation dialog body for archive actions.
pub fn confirm_dialog<'a, M: Clone + 'a>(
    prompt: &'a str,
    on_confirm: M,
    on_decline: M,
) -> Element<'a, M> {
    column![
        text("Please confirm").size(18),
        text(prompt).size(14),
        row![
            Space::with_width(Length::Fill),
            button(text("Cancel").size(14))
                .style(button::secondary)
                .on_press(on_decline),
            button(text("Archive").size(14))
                .style(button::danger)
                .on_press(on_confirm),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    ]
    .spacing(16)
    .width(360)
    .into()
}
