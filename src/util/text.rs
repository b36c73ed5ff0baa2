use std::borrow::Cow;

/// Characters that cannot appear in a generated filename stem.
const REPLACED: [char; 3] = [' ', '/', '\\'];

/// Turns a book title into a filename stem.
///
/// Spaces and path separators become `-`; everything else is kept as-is,
/// so the mapping is deterministic and the stem stays recognisable.
///
/// Returns `Cow::Borrowed` when nothing needs replacing.
///
/// # Examples
///
/// ```
/// use readshelf::util::sanitize_title;
///
/// assert_eq!(sanitize_title("Dune"), "Dune");
/// assert_eq!(sanitize_title("The Left Hand of Darkness"), "The-Left-Hand-of-Darkness");
/// assert_eq!(sanitize_title("Either/Or"), "Either-Or");
/// ```
pub fn sanitize_title(title: &str) -> Cow<'_, str> {
    if !title.contains(REPLACED) {
        return Cow::Borrowed(title);
    }
    Cow::Owned(title.replace(REPLACED, "-"))
}
