//! Synchronous FTP session wrapper
//!
//! `FtpWrapper` keeps one plain FTP connection and offers the handful of
//! operations needed to move files around: login, transfer mode, up- and
//! download, listings and directory navigation.

use crate::config::Settings;
use crate::logging::Logger;
use scopeguard::ScopeGuard;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::net::ToSocketAddrs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use suppaftp::list::File as ListEntry;
use suppaftp::types::{FileType, FormatControl, Mode};
use suppaftp::FtpStream;

pub use suppaftp::FtpError;

const LOG: Logger = Logger::new(module_path!());

/// Default FTP control port
pub const DEFAULT_PORT: u16 = 21;

/// Transfer mode for file operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Binary mode (untransformed)
    Binary,
    /// ASCII/text mode (with line ending conversion)
    Ascii,
}

impl From<TransferMode> for FileType {
    fn from(mode: TransferMode) -> Self {
        match mode {
            TransferMode::Binary => FileType::Binary,
            TransferMode::Ascii => FileType::Ascii(FormatControl::NonPrint),
        }
    }
}

fn not_connected() -> FtpError {
    FtpError::ConnectionError(io::Error::new(
        io::ErrorKind::NotConnected,
        "FTP session is not connected",
    ))
}

/// Thin wrapper around one FTP connection
pub struct FtpWrapper {
    stream: Option<FtpStream>,
    timeout: Duration,
    passive: bool,
}

impl Default for FtpWrapper {
    fn default() -> Self {
        FtpWrapper::new(Duration::from_secs(crate::config::DEFAULT_FTP_TIMEOUT_SECS))
    }
}

impl FtpWrapper {
    /// Creates an unconnected wrapper using `timeout` for connects
    pub fn new(timeout: Duration) -> Self {
        FtpWrapper {
            stream: None,
            timeout,
            passive: false,
        }
    }

    /// Unconnected wrapper with the configured connect timeout
    pub fn from_settings(settings: &Settings) -> Self {
        FtpWrapper::new(settings.ftp_connect_timeout())
    }

    fn mode(&self) -> Mode {
        if self.passive {
            Mode::Passive
        } else {
            Mode::Active
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn stream_mut(&mut self) -> Result<&mut FtpStream, FtpError> {
        self.stream.as_mut().ok_or_else(not_connected)
    }

    /// Connects to `host:port` and logs in
    ///
    /// Every address `host` resolves to is tried in turn.
    ///
    /// # Returns
    /// * `Ok(true)` - connected and logged in
    /// * `Ok(false)` - the server rejected the login; the connection is closed
    ///
    /// # Errors
    /// Name resolution or connection failures.
    pub fn connect_and_login(
        &mut self,
        host: &str,
        port: u16,
        user: &str,
        password: &str,
    ) -> Result<bool, FtpError> {
        self.close();

        let mut stream = connect_any(host, port, self.timeout)?;
        stream.set_mode(self.mode());

        match stream.login(user, password) {
            Ok(()) => {
                let _ = LOG.info(&format!("Logged in to ftp://{}@{}:{}", user, host, port));
                self.stream = Some(stream);
                Ok(true)
            }
            Err(e @ FtpError::UnexpectedResponse(_)) => {
                let _ = LOG.info(&format!(
                    "Login to {}:{} rejected: {}",
                    host,
                    port,
                    e.to_string().replace('\n', " ")
                ));
                let _ = stream.quit();
                Ok(false)
            }
            Err(e) => {
                let _ = stream.quit();
                Err(e)
            }
        }
    }

    /// Switches between passive and active data connections
    ///
    /// Takes effect immediately when connected and is kept for later
    /// connections.
    pub fn set_passive_mode(&mut self, passive: bool) {
        self.passive = passive;
        let mode = self.mode();
        if let Some(stream) = self.stream.as_mut() {
            stream.set_mode(mode);
        }
    }

    pub fn transfer_type(&mut self, mode: TransferMode) -> Result<(), FtpError> {
        self.stream_mut()?.transfer_type(mode.into())
    }

    /// ASCII transfer type
    pub fn ascii(&mut self) -> Result<(), FtpError> {
        self.transfer_type(TransferMode::Ascii)
    }

    /// Binary transfer type
    pub fn binary(&mut self) -> Result<(), FtpError> {
        self.transfer_type(TransferMode::Binary)
    }

    /// Downloads `server_file` into `local_file`
    ///
    /// A partially written local file is removed when the transfer fails.
    ///
    /// # Returns
    /// Number of bytes written.
    pub fn download_file(&mut self, server_file: &str, local_file: &Path) -> Result<u64, FtpError> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;

        let _ = LOG.info(&format!(
            "Downloading file ->{}<- to local file ->{}<-.",
            server_file,
            local_file.display()
        ));

        let file = File::create(local_file).map_err(FtpError::ConnectionError)?;
        let cleanup = scopeguard::guard(local_file.to_path_buf(), |path| {
            let _ = fs::remove_file(path);
        });

        let mut writer = BufWriter::new(file);
        let copied = stream.retr(server_file, |reader| {
            io::copy(reader, &mut writer).map_err(FtpError::ConnectionError)
        })?;
        writer.flush().map_err(FtpError::ConnectionError)?;

        ScopeGuard::into_inner(cleanup);
        Ok(copied)
    }

    /// Uploads `local_file` as `server_file`
    ///
    /// # Returns
    /// Number of bytes sent.
    pub fn upload_file(&mut self, local_file: &Path, server_file: &str) -> Result<u64, FtpError> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;

        let _ = LOG.info(&format!(
            "Uploading local file ->{}<- to file ->{}<-.",
            local_file.display(),
            server_file
        ));

        let file = File::open(local_file).map_err(FtpError::ConnectionError)?;
        let mut reader = BufReader::new(file);
        stream.put_file(server_file, &mut reader)
    }

    /// Names of the plain files in the current directory
    pub fn list_file_names(&mut self) -> Result<Vec<String>, FtpError> {
        let lines = self.stream_mut()?.list(None)?;
        Ok(split_listing(&lines).0)
    }

    /// [`FtpWrapper::list_file_names`], one name per line
    pub fn list_file_names_string(&mut self) -> Result<String, FtpError> {
        Ok(self.list_file_names()?.join("\n"))
    }

    /// Names of the subdirectories of the current directory
    pub fn list_subdir_names(&mut self) -> Result<Vec<String>, FtpError> {
        let lines = self.stream_mut()?.list(None)?;
        Ok(split_listing(&lines).1)
    }

    /// [`FtpWrapper::list_subdir_names`], one name per line
    pub fn list_subdir_names_string(&mut self) -> Result<String, FtpError> {
        Ok(self.list_subdir_names()?.join("\n"))
    }

    /// Changes the working directory
    ///
    /// # Returns
    /// `Ok(false)` when the server refuses, e.g. because the directory
    /// does not exist.
    pub fn change_working_directory(&mut self, directory: &str) -> Result<bool, FtpError> {
        match self.stream_mut()?.cwd(directory) {
            Ok(()) => Ok(true),
            Err(FtpError::UnexpectedResponse(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn make_directory(&mut self, directory: &str) -> Result<(), FtpError> {
        self.stream_mut()?.mkdir(directory)
    }

    /// Changes to `root_directory/directory`, creating missing parts of
    /// `directory` on the way
    ///
    /// # Errors
    /// - `/` or `root_directory` cannot be entered
    /// - a directory cannot be created or entered after creation
    pub fn change_or_create_directory(&mut self, root_directory: &str, directory: &str) -> Result<(), FtpError> {
        let ok = self.change_working_directory("/")? && self.change_working_directory(root_directory)?;
        if !ok {
            return Err(FtpError::ConnectionError(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Unable to change to the root directory {}", root_directory),
            )));
        }

        for dir in directory.split('/').filter(|d| !d.is_empty()) {
            if self.change_working_directory(dir)? {
                continue;
            }
            let _ = LOG.debug(&format!("Creating remote directory {}", dir));
            self.make_directory(dir)?;
            if !self.change_working_directory(dir)? {
                return Err(FtpError::ConnectionError(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Unable to enter created directory {}", dir),
                )));
            }
        }

        Ok(())
    }

    /// Logs out and disconnects; errors are ignored
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.quit();
        }
    }
}

/// Tries every address `host` resolves to until one accepts
fn connect_any(host: &str, port: u16, timeout: Duration) -> Result<FtpStream, FtpError> {
    let addrs: Vec<std::net::SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(FtpError::ConnectionError)?
        .collect();

    let mut last_error = None;
    for addr in addrs {
        match FtpStream::connect_timeout(addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                let _ = LOG.debug(&format!("Connecting to {} failed: {}", addr, e));
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        FtpError::ConnectionError(io::Error::new(
            io::ErrorKind::NotFound,
            format!("No addresses found for {}", host),
        ))
    }))
}

/// Splits `LIST` output into (file names, directory names)
///
/// The `total N` header and lines the listing parser does not understand
/// are skipped.
fn split_listing(lines: &[String]) -> (Vec<String>, Vec<String>) {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for line in lines {
        if line.trim_start().starts_with("total ") {
            continue;
        }
        match ListEntry::from_str(line) {
            Ok(entry) if entry.is_directory() => dirs.push(entry.name().to_string()),
            Ok(entry) => files.push(entry.name().to_string()),
            Err(_) => {
                let _ = LOG.debug(&format!("Skipping unparsable listing line: {}", line));
            }
        }
    }
    (files, dirs)
}
