mod game;
pub(crate) mod release;
pub(crate) mod storage;

pub use game::{Game, GameRow, GamesPage, Translation, TranslationStatus};
pub use release::{total_downloads, DownloadLinks, Platform, Release, ReleaseSnapshot};
