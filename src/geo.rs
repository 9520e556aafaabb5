//! Pretty-printing of geographic coordinates for the status bar.

/// Degrees/minutes with hemisphere letter, e.g. `59° 20' N`.
fn format_angle(radians: f64, positive: char, negative: char) -> String {
    let degrees_total = radians.to_degrees();
    let a = degrees_total.abs();
    let mut degrees = a.floor();
    let mut minutes = (60.0 * (a - degrees)).round();
    if minutes >= 60.0 {
        minutes = 0.0;
        degrees += 1.0;
    }
    let dir = if degrees_total < 0.0 { negative } else { positive };
    format!("{}° {}' {}", degrees as i64, minutes as i64, dir)
}

/// Latitude in radians → `D° M' N|S`.
pub fn format_latitude(latitude: f64) -> String {
    format_angle(latitude, 'N', 'S')
}

/// Longitude in radians → `D° M' E|W`.
pub fn format_longitude(longitude: f64) -> String {
    format_angle(longitude, 'E', 'W')
}
