use iced::widget::text_input as iced_text_input;

pub fn text_input<'a, Message: Clone>(
    placeholder: &'a str,
    value: &'a str,
) -> iced_text_input::TextInput<'a, Message> {
    iced_text_input::TextInput::new(placeholder, value)
}

/// Search field that reports every edit
pub fn search_input<'a, Message: Clone + 'a>(
    placeholder: &'a str,
    value: &'a str,
    on_input: impl Fn(String) -> Message + 'a,
) -> iced_text_input::TextInput<'a, Message> {
    text_input(placeholder, value).on_input(on_input).padding(8)
}
