mod email_directory;

pub use email_directory::InMemoryEmailDirectory;
