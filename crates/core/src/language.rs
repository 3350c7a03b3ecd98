//! Supported languages and their static text.
//!
//! Every per-language string the pipeline needs (prompt suffixes, the speech
//! tone instruction, fallback content and the UI labels) lives in a single
//! `LanguageConfig` record. `Language::config` is an exhaustive match, so adding
//! a language without its text is a compile error.

use crate::experience::GeneratedExperience;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Tr,
    En,
    De,
}

/// Static UI strings shown by the presentation layer.
#[derive(Debug)]
pub struct UiText {
    pub header_title: &'static str,
    pub header_subtitle: &'static str,
    pub header_desc: &'static str,
    pub modal_loading: &'static str,
    pub modal_error: &'static str,
    pub modal_quote: &'static str,
    pub modal_done: &'static str,
    pub listen_button: &'static str,
    pub stop_button: &'static str,
    pub audio_loading: &'static str,
    pub playback_error: &'static str,
}

/// Fixed-field configuration record for one language.
#[derive(Debug)]
pub struct LanguageConfig {
    /// Appended to the methodology instruction when generating an experience.
    pub prompt_suffix: &'static str,
    /// Prepended to the experience text before speech synthesis.
    pub tone_instruction: &'static str,
    pub fallback_title: &'static str,
    pub fallback_content: &'static str,
    pub fallback_duration: &'static str,
    pub ui: UiText,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Tr, Language::En, Language::De];

    pub fn code(self) -> &'static str {
        match self {
            Language::Tr => "tr",
            Language::En => "en",
            Language::De => "de",
        }
    }

    pub fn config(self) -> &'static LanguageConfig {
        match self {
            Language::Tr => &TR,
            Language::En => &EN,
            Language::De => &DE,
        }
    }

    /// The statically authored experience used whenever generation fails.
    pub fn fallback_experience(self) -> GeneratedExperience {
        let config = self.config();
        GeneratedExperience {
            title: config.fallback_title.to_string(),
            content: config.fallback_content.to_string(),
            duration: config.fallback_duration.to_string(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unsupported language code: '{0}' (expected one of tr, en, de)")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tr" => Ok(Language::Tr),
            "en" => Ok(Language::En),
            "de" => Ok(Language::De),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

static TR: LanguageConfig = LanguageConfig {
    prompt_suffix: "Kullanıcının şu an (otururken/ayaktayken) yapabileceği kısa bir \"Deneyim\" (Experience) tasarla.\n\
                    Mekanik bir egzersiz değil, bir keşif olsun.\n\
                    Ses tonu: Nazik, davetkar, yavaş.\n\
                    Çıktı dili: Türkçe.",
    tone_instruction: "Lütfen bu metni çok yavaş, nazik, sakinleştirici ve meditatif bir ses tonuyla oku. Cümleler arasında belirgin esler ver: ",
    fallback_title: "Basit Farkındalık",
    fallback_content: "Şu anda nefesinize odaklanın. Nefes alırken omuzlarınızın nasıl hareket ettiğini fark edin. Sadece gözlemleyin, değiştirmeye çalışmayın.",
    fallback_duration: "1 dakika",
    ui: UiText {
        header_title: "Anat Baniel Metodu",
        header_subtitle: "9 Temel Prensip (Essentials)",
        header_desc: "Beyni uyandırmanın ve potansiyelinize erişmenin anahtarları. Detaylı bir farkındalık deneyimi almak için bir prensip seçin.",
        modal_loading: "AI size özel bir deneyim (experience) hazırlıyor...",
        modal_error: "Bir hata oluştu. Lütfen tekrar deneyin.",
        modal_quote: "\"Beynin en iyi öğrendiği an, her şeyin yavaşladığı ve farkındalığın arttığı andır.\"",
        modal_done: "Tamamladım",
        listen_button: "Deneyimi Dinle",
        stop_button: "Durdur",
        audio_loading: "Ses hazırlanıyor...",
        playback_error: "Ses oynatılırken bir sorun oluştu.",
    },
};

static EN: LanguageConfig = LanguageConfig {
    prompt_suffix: "Design a short \"Experience\" that the user can do right now (sitting/standing).\n\
                    Not a mechanical exercise, but an exploration/discovery.\n\
                    Tone: Gentle, inviting, slow.\n\
                    Output language: English.",
    tone_instruction: "Please read this text in a very slow, gentle, soothing, and meditative tone. Pause clearly between sentences: ",
    fallback_title: "Simple Awareness",
    fallback_content: "Focus on your breath right now. Notice how your shoulders move as you inhale. Just observe, do not try to change it.",
    fallback_duration: "1 minute",
    ui: UiText {
        header_title: "Anat Baniel Method",
        header_subtitle: "The 9 Essentials",
        header_desc: "Keys to waking up the brain and accessing your potential. Pick any essential to get a detailed mindfulness experience.",
        modal_loading: "AI is preparing a custom experience for you...",
        modal_error: "An error occurred. Please try again.",
        modal_quote: "\"The brain learns best when everything slows down and awareness increases.\"",
        modal_done: "Done",
        listen_button: "Listen to Experience",
        stop_button: "Stop",
        audio_loading: "Preparing audio...",
        playback_error: "There was a problem playing the audio.",
    },
};

static DE: LanguageConfig = LanguageConfig {
    prompt_suffix: "Entwerfe ein kurzes \"Erlebnis\" (keine Übung!), das der Benutzer jetzt sofort (im Sitzen/Stehen) machen kann.\n\
                    Es soll keine mechanische Wiederholung sein, sondern eine Entdeckung.\n\
                    Tonfall: Sanft, einladend, langsam.\n\
                    Ausgabesprache: Deutsch.",
    tone_instruction: "Bitte lesen Sie diesen Text in einem sehr langsamen, sanften, beruhigenden und meditativen Ton. Mach deutliche Pausen: ",
    fallback_title: "Einfache Achtsamkeit",
    fallback_content: "Konzentrieren Sie sich jetzt auf Ihren Atem. Bemerken Sie, wie sich Ihre Schultern beim Einatmen bewegen. Beobachten Sie nur, versuchen Sie nicht, es zu ändern.",
    fallback_duration: "1 Minute",
    ui: UiText {
        header_title: "Anat Baniel Methode",
        header_subtitle: "Die 9 Essentials",
        header_desc: "Schlüssel zum Aufwecken des Gehirns und zum Erschließen Ihres Potenzials. Wählen Sie ein Essential für ein KI-Erlebnis.",
        modal_loading: "KI bereitet ein spezielles Erlebnis für dich vor...",
        modal_error: "Ein Fehler ist aufgetreten. Bitte versuchen Sie es erneut.",
        modal_quote: "\"Das Gehirn erzeugt neue Informationen durch die Wahrnehmung von Unterschieden.\"",
        modal_done: "Fertig",
        listen_button: "Erlebnis anhören",
        stop_button: "Stoppen",
        audio_loading: "Audio wird vorbereitet...",
        playback_error: "Beim Abspielen des Audios ist ein Problem aufgetreten.",
    },
};
