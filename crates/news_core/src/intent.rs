#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// The view is ready for data. Honoured once per session.
    Initial,
    /// The view scrolled far enough to want the given page.
    LoadMore { page: u32 },
}
