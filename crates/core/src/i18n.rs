//! Localized, human-readable messages for API error bodies.
//!
//! Every user-facing error carries a [`Message`] rather than a preformatted
//! string so the HTTP layer can render it in the locale negotiated from the
//! request's `Accept-Language` header.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Locales the message catalog is translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    /// ISO 639-1 code.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }

    /// Pick the best supported locale from an `Accept-Language` header value.
    ///
    /// Entries are ranked by their `q` weight (default `1.0`); ties keep
    /// header order. Only the primary subtag is compared, so `es-MX`
    /// selects [`Locale::Es`]. Falls back to [`Locale::En`].
    pub fn from_accept_language(header: &str) -> Self {
        let mut ranked: Vec<(f32, &str)> = header
            .split(',')
            .filter_map(|entry| {
                let mut parts = entry.split(';');
                let tag = parts.next()?.trim();
                if tag.is_empty() || tag == "*" {
                    return None;
                }
                let weight = parts
                    .filter_map(|p| p.trim().strip_prefix("q="))
                    .find_map(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some((weight, tag))
            })
            .collect();

        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        ranked
            .into_iter()
            .filter(|(weight, _)| *weight > 0.0)
            .find_map(|(_, tag)| {
                let primary = tag.split('-').next().unwrap_or(tag);
                primary.parse::<Locale>().ok()
            })
            .unwrap_or_default()
    }
}

impl FromStr for Locale {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "es" => Ok(Self::Es),
            _ => Err(()),
        }
    }
}

/// Catalog of user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    MissingField(String),
    InvalidField(String),
    InvalidEmail,
    InvalidUrl,
    UrlNotAllowed,
    NotAuthenticated,
    InvalidCredentials,
    InvalidCallbackSignature,
    NotFound(String),
    FileTooLarge { max_bytes: u64 },
    EmptyFile,
    UnsupportedFileType(String),
    FileTypeMismatch,
    UpstreamTimeout,
    UpstreamFailure,
    WebhookNotConfigured(String),
    Forbidden,
    Internal,
    /// Free text that has no catalog entry (rendered as-is in every locale).
    Detail(String),
}

impl Message {
    /// Render the message in the given locale.
    pub fn text(&self, locale: Locale) -> String {
        match locale {
            Locale::En => self.english(),
            Locale::Es => self.spanish(),
        }
    }

    fn english(&self) -> String {
        match self {
            Self::MissingField(field) => format!("Missing required field: {field}"),
            Self::InvalidField(field) => format!("Invalid value for field: {field}"),
            Self::InvalidEmail => "Please enter a valid email address".into(),
            Self::InvalidUrl => "Please enter a valid website URL".into(),
            Self::UrlNotAllowed => "That URL points to a private or internal address".into(),
            Self::NotAuthenticated => "You must be signed in to do that".into(),
            Self::InvalidCredentials => "Invalid email or password".into(),
            Self::InvalidCallbackSignature => "Invalid callback signature".into(),
            Self::NotFound(entity) => format!("{entity} not found"),
            Self::FileTooLarge { max_bytes } => {
                format!("File is too large. The maximum size is {} MB", mebibytes(*max_bytes))
            }
            Self::EmptyFile => "The file is empty".into(),
            Self::UnsupportedFileType(kind) => {
                format!("Unsupported file type '{kind}'. Allowed: JPEG, PNG, WebP, GIF")
            }
            Self::FileTypeMismatch => "The file contents do not match its declared type".into(),
            Self::UpstreamTimeout => {
                "The generation service took too long to respond. Please try again".into()
            }
            Self::UpstreamFailure => {
                "The generation service is unavailable right now. Please try again later".into()
            }
            Self::WebhookNotConfigured(kind) => format!("The {kind} service is not configured"),
            Self::Forbidden => "You do not have access to this resource".into(),
            Self::Internal => "An internal error occurred".into(),
            Self::Detail(text) => text.clone(),
        }
    }

    fn spanish(&self) -> String {
        match self {
            Self::MissingField(field) => format!("Falta el campo obligatorio: {field}"),
            Self::InvalidField(field) => format!("Valor no válido para el campo: {field}"),
            Self::InvalidEmail => "Introduce un correo electrónico válido".into(),
            Self::InvalidUrl => "Introduce una URL de sitio web válida".into(),
            Self::UrlNotAllowed => "Esa URL apunta a una dirección privada o interna".into(),
            Self::NotAuthenticated => "Debes iniciar sesión para hacer eso".into(),
            Self::InvalidCredentials => "Correo electrónico o contraseña incorrectos".into(),
            Self::InvalidCallbackSignature => "Firma de retorno no válida".into(),
            Self::NotFound(entity) => format!("No se encontró {entity}"),
            Self::FileTooLarge { max_bytes } => format!(
                "El archivo es demasiado grande. El tamaño máximo es {} MB",
                mebibytes(*max_bytes)
            ),
            Self::EmptyFile => "El archivo está vacío".into(),
            Self::UnsupportedFileType(kind) => {
                format!("Tipo de archivo no admitido '{kind}'. Permitidos: JPEG, PNG, WebP, GIF")
            }
            Self::FileTypeMismatch => {
                "El contenido del archivo no coincide con el tipo declarado".into()
            }
            Self::UpstreamTimeout => {
                "El servicio de generación tardó demasiado en responder. Inténtalo de nuevo".into()
            }
            Self::UpstreamFailure => {
                "El servicio de generación no está disponible. Inténtalo más tarde".into()
            }
            Self::WebhookNotConfigured(kind) => format!("El servicio {kind} no está configurado"),
            Self::Forbidden => "No tienes acceso a este recurso".into(),
            Self::Internal => "Se produjo un error interno".into(),
            Self::Detail(text) => text.clone(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.english())
    }
}

fn mebibytes(bytes: u64) -> u64 {
    bytes / (1024 * 1024)
}
