/// Content packages are named `Author-Name` (every dash-separated part at least two
/// characters long). `Self` refers to the game mode's own package.
pub fn is_valid_package_name(name: &str) -> bool {
    if name == "Self" {
        return true;
    }

    if !name.contains('-') {
        return false;
    }

    name.split('-').all(|part| part.chars().count() >= 2)
}
