use crate::refs::{ObjectReferences, RefType};
use chrono::{DateTime, Datelike, FixedOffset, Local, Timelike};
use pdf_writer::{Date, Name, Pdf, TextStr};

/// Metadata for the document information dictionary.
///
/// Attach one with [crate::Controller::set_info]; without it no information
/// dictionary is written.
#[derive(Default, Debug, Clone)]
pub struct Info {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    /// Usually a comma separated list
    pub keywords: Option<String>,
    /// Creation timestamp; the time of writing when not set
    pub created: Option<DateTime<FixedOffset>>,
}

impl Info {
    pub fn new() -> Info {
        Info::default()
    }

    pub fn title<S: Into<String>>(&mut self, title: S) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn author<S: Into<String>>(&mut self, author: S) -> &mut Self {
        self.author = Some(author.into());
        self
    }

    pub fn subject<S: Into<String>>(&mut self, subject: S) -> &mut Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn keywords<S: Into<String>>(&mut self, keywords: S) -> &mut Self {
        self.keywords = Some(keywords.into());
        self
    }

    pub fn created(&mut self, created: DateTime<FixedOffset>) -> &mut Self {
        self.created = Some(created);
        self
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, writer: &mut Pdf) {
        let mut dict = writer.document_info(refs.gen(RefType::Info));

        let fields = [
            ("Title", &self.title),
            ("Author", &self.author),
            ("Subject", &self.subject),
            ("Keywords", &self.keywords),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                dict.pair(Name(key.as_bytes()), TextStr(value));
            }
        }
        dict.creator(TextStr(concat!(
            env!("CARGO_PKG_NAME"),
            " v",
            env!("CARGO_PKG_VERSION")
        )));

        let created = self.created.unwrap_or_else(|| Local::now().fixed_offset());
        dict.creation_date(pdf_date(&created));
    }
}

/// Convert a timestamp into a PDF date, keeping its UTC offset
fn pdf_date(time: &DateTime<FixedOffset>) -> Date {
    let offset = time.offset().local_minus_utc();
    let hours = offset / 3600;
    let minutes = (offset % 3600 / 60).abs();
    Date::new(time.year() as u16)
        .month(time.month() as u8)
        .day(time.day() as u8)
        .hour(time.hour() as u8)
        .minute(time.minute() as u8)
        .second(time.second() as u8)
        .utc_offset_hour(hours as i8)
        .utc_offset_minute(minutes as u8)
}
