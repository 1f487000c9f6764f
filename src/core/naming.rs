//! URL segment derivation for resource names

/// Convert a resource name to the URL segment it is mounted under
///
/// The name is split before every uppercase ASCII letter (a `.` right before
/// that letter is dropped), the parts are joined with `-` and lowercased.
///
/// # Examples
///
/// ```
/// use jsonapi_gateway::core::naming::resource_segment;
///
/// assert_eq!(resource_segment("Starship"), "starship");
/// assert_eq!(resource_segment("StarshipApi"), "starship-api");
/// assert_eq!(resource_segment("astronomicalObject"), "astronomical-object");
/// assert_eq!(resource_segment("Api.StarshipClass"), "api-starship-class");
/// ```
pub fn resource_segment(name: &str) -> String {
    let mut segment = String::with_capacity(name.len() + 4);

    for (index, ch) in name.char_indices() {
        if ch.is_ascii_uppercase() && index > 0 {
            if segment.ends_with('.') {
                segment.pop();
            }
            segment.push('-');
        }
        segment.extend(ch.to_lowercase());
    }

    segment
}

/// Whether a segment can be mounted as a single path component
pub fn is_routable(segment: &str) -> bool {
    !segment.is_empty()
        && !segment
            .chars()
            .any(|c| matches!(c, '/' | '{' | '}' | '*' | '?' | '#' | '%') || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_word() {
        assert_eq!(resource_segment("Starship"), "starship");
        assert_eq!(resource_segment("starship"), "starship");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(resource_segment("StarshipApi"), "starship-api");
        assert_eq!(resource_segment("AstronomicalObject"), "astronomical-object");
        assert_eq!(resource_segment("bookSeries"), "book-series");
    }

    #[test]
    fn test_consecutive_uppercase_letters_split_individually() {
        assert_eq!(resource_segment("APIClient"), "a-p-i-client");
    }

    #[test]
    fn test_dot_before_uppercase_is_consumed() {
        assert_eq!(resource_segment("Api.Starship"), "api-starship");
        assert_eq!(resource_segment("api.starship"), "api.starship");
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(resource_segment(""), "");
    }

    #[test]
    fn test_non_ascii_letters_are_kept() {
        assert_eq!(resource_segment("ÉtoileNoire"), "étoile-noire");
    }

    #[test]
    fn test_routable_segments() {
        assert!(is_routable("starship-api"));
        assert!(!is_routable(""));
        assert!(!is_routable("star/ship"));
        assert!(!is_routable("{id}"));
        assert!(!is_routable("star ship"));
        assert!(!is_routable("star?ship"));
        assert!(!is_routable("star#ship"));
        assert!(!is_routable("star%20ship"));
    }
}
