//! Guessing the light and dark variants of a GTK theme.
//!
//! GTK themes usually ship their variants as separately named themes, and
//! every family has its own naming convention. [`guess_variants`] knows the
//! conventions of the common families and falls back to the `-dark` suffix
//! convention for everything else.
//!
//! Light variant suffixes, most generic first: `""`, `-light`, `-darker`.
//! Dark variant suffixes, most generic first: `-dark`, `-darkest`.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// The day and night variants guessed for a theme name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThemeVariants {
    /// The name that was passed in.
    pub original: String,
    /// The guessed light variant.
    pub day: String,
    /// The guessed dark variant.
    pub night: String,
}

impl ThemeVariants {
    /// Returns true if the original name is the night variant.
    pub fn is_night(&self) -> bool {
        self.original == self.night
    }
}

struct Patterns {
    /// `-Dark`, `-Darker`
    title_dark: Regex,
    /// `-dark`, `-darker`, `-darkest`
    lower_dark: Regex,
    arc_base: Regex,
    cabinet_night: Regex,
    compact_family: Regex,
    compact_night: Regex,
    plata_base: Regex,
    prof_gnome: Regex,
    prof_gnome_night: Regex,
    teja_day: Regex,
    vimix_base: Regex,
    generic_night: Regex,
}

impl Patterns {
    fn get() -> &'static Patterns {
        static PATTERNS: OnceLock<Patterns> = OnceLock::new();
        PATTERNS.get_or_init(|| {
            let re = |pattern: &str| Regex::new(pattern).expect("variant pattern is valid");
            Patterns {
                title_dark: re("-Dark(er)?"),
                lower_dark: re("-dark(er|est)?"),
                arc_base: re("Arc(-Darker)?"),
                cabinet_night: re("-Light|-Darker"),
                compact_family: re("^(Canta|ChromeOS|Materia|Orchis).*-compact"),
                compact_night: re("(-light)?-compact"),
                plata_base: re("Plata(-Lumine)?"),
                prof_gnome: re("^Prof-Gnome-(.+)-3(.*)"),
                prof_gnome_night: re("-Light(-DS)?|-Darker"),
                teja_day: re("_Dark(est)?|_Black"),
                vimix_base: re("vimix(-light)?"),
                generic_night: re("-light|-darker"),
            }
        })
    }
}

/// Replace `-Dark` (but not `-Darker`) with `replacement`.
fn replace_title_dark(patterns: &Patterns, name: &str, replacement: &str) -> String {
    patterns
        .title_dark
        .replace_all(name, |caps: &Captures<'_>| {
            if caps.get(1).is_some() {
                caps[0].to_string()
            } else {
                replacement.to_string()
            }
        })
        .into_owned()
}

/// Guess the day and night variants of `name`.
pub fn guess_variants(name: &str) -> ThemeVariants {
    let patterns = Patterns::get();
    let (day, night) = if name.contains("Adapta") {
        let day = name.replace("-Nokto", "");
        let night = day.replace("Adapta", "Adapta-Nokto");
        (day, night)
    } else if name.contains("Arc") {
        let day = replace_title_dark(patterns, name, "");
        let night = patterns.arc_base.replace_all(&day, "Arc-Dark").into_owned();
        (day, night)
    } else if name.contains("Cabinet") {
        let day = replace_title_dark(patterns, name, "-Light");
        let night = patterns.cabinet_night.replace_all(&day, "-Dark").into_owned();
        (day, night)
    } else if patterns.compact_family.is_match(name) {
        let day = name.replace("-dark", "");
        let night = patterns
            .compact_night
            .replace_all(&day, "-dark-compact")
            .into_owned();
        (day, night)
    } else if name.contains("Flat-Remix-GTK") {
        flat_remix(name)
    } else if name.contains("HighContrast") {
        ("HighContrast".to_string(), "HighContrastInverse".to_string())
    } else if ["Layan", "Macwaita", "Matcha", "Nextwaita"]
        .iter()
        .any(|family| name.starts_with(family))
    {
        let base = name.split('-').next().unwrap_or(name);
        let day = name.replace("-dark", "");
        let rest = &day[base.len().min(day.len())..];
        let rest = rest.strip_prefix("-light").unwrap_or(rest);
        let night = format!("{base}-dark{rest}");
        (day, night)
    } else if name.contains("Mojave") {
        let day = name.replace("-dark", "-light");
        let night = day.replace("-light", "-dark");
        (day, night)
    } else if name.contains("Plata") {
        let day = name.replace("-Noir", "");
        let night = patterns.plata_base.replace_all(&day, "Plata-Noir").into_owned();
        (day, night)
    } else if patterns.prof_gnome.is_match(name) {
        let day = replace_title_dark(patterns, name, "-Light");
        let night = patterns
            .prof_gnome_night
            .replace_all(&day, "-Dark")
            .into_owned();
        (day, night)
    } else if name.contains("Simply_Circles") {
        (name.replace("_Dark", "_Light"), name.replace("_Light", "_Dark"))
    } else if name.contains("Teja") {
        teja(patterns, name)
    } else if name.contains("vimix") {
        let day = name.replace("-dark", "");
        let night = patterns.vimix_base.replace_all(&day, "vimix-dark").into_owned();
        (day, night)
    } else {
        let day = patterns
            .lower_dark
            .replace_all(name, |caps: &Captures<'_>| match caps.get(1) {
                Some(suffix) if suffix.as_str() == "er" => caps[0].to_string(),
                _ => String::new(),
            })
            .into_owned();
        let suffix = if name.contains("-darkest") {
            "-darkest"
        } else {
            "-dark"
        };
        let night = format!("{}{suffix}", patterns.generic_night.replace_all(&day, ""));
        (day, night)
    };

    ThemeVariants {
        original: name.to_string(),
        day,
        night,
    }
}

fn flat_remix(name: &str) -> (String, String) {
    let solid = if name.contains("-Solid") { "-Solid" } else { "" };
    let no_border = if name.contains("-NoBorder") {
        "-NoBorder"
    } else {
        ""
    };
    let base = name.split('-').take(4).collect::<Vec<_>>().join("-");

    let darker = if name.contains("-Darker") { "-Darker" } else { "" };
    let dark = if name.contains("-Darkest") {
        "-Darkest"
    } else {
        "-Dark"
    };
    (
        format!("{base}{darker}{solid}"),
        format!("{base}{dark}{solid}{no_border}"),
    )
}

fn teja(patterns: &Patterns, name: &str) -> (String, String) {
    // Teja_Light -> ["Teja"], Teja_Darkest -> ["Teja", "Darkest"]
    let without_light = name.replace("_Light", "");
    let dark_suffix = without_light.split('_').nth(1).unwrap_or("Dark");

    let day = patterns.teja_day.replace_all(name, "").into_owned();
    let night = format!("{}_{dark_suffix}", day.replace("_Light", ""));
    (day, night)
}
