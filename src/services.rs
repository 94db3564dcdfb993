pub(crate) mod marks;
pub(crate) mod telegram_bot;
