mod fetcher;
mod release_index;

pub use fetcher::{DownloadObserver, GoDevFetcher};
pub use release_index::{
    archive_file_name, go_arch, go_os, index_url, parse_release_index, select_archive, GoFile,
    GoRelease,
};

#[cfg(test)]
mod tests;
