//! IMAP client for connecting to email servers.

use async_imap::Session;
use async_native_tls::TlsConnector;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use log::{debug, info, warn};
use secrecy::{ExposeSecret, SecretString};

use crate::config::Settings;

use super::error::{EmailError, Result};
use super::source::{MailSource, SearchQuery};

/// Type alias for the underlying async stream (using async-std compatible TcpStream).
type AsyncTcpStream = async_io::Async<std::net::TcpStream>;

/// Type alias for the TLS stream used by the IMAP session.
type TlsStream = async_native_tls::TlsStream<AsyncTcpStream>;

/// Username and password entered by the user.
#[derive(Debug, Clone)]
pub struct ImapCredentials {
    pub username: String,
    pub password: SecretString,
}

impl ImapCredentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

/// IMAP client for searching and fetching messages in one folder.
pub struct ImapClient {
    session: Option<Session<TlsStream>>,
    host: String,
    port: u16,
    folder: String,
    credentials: ImapCredentials,
}

impl ImapClient {
    /// Creates a new IMAP client for the server described by `settings`.
    pub fn new(settings: &Settings, credentials: ImapCredentials) -> Self {
        Self {
            session: None,
            host: settings.host.clone(),
            port: settings.port,
            folder: settings.folder.clone(),
            credentials,
        }
    }

    /// Connects over TLS, logs in and selects the configured folder.
    ///
    /// If selecting the folder fails the session is logged out before the
    /// error is returned.
    pub async fn connect(&mut self) -> Result<()> {
        if self.session.is_some() {
            debug!("Already connected to IMAP server");
            return Ok(());
        }

        let addr = format!("{}:{}", self.host, self.port);
        info!("Connecting to IMAP server at {}", addr);

        // Establish TCP connection using std::net and wrap with async-io
        let std_stream = std::net::TcpStream::connect(&addr)
            .map_err(|e| EmailError::ConnectionFailed(e.to_string()))?;
        std_stream
            .set_nonblocking(true)
            .map_err(|e| EmailError::ConnectionFailed(e.to_string()))?;
        let tcp_stream = async_io::Async::new(std_stream)
            .map_err(|e| EmailError::ConnectionFailed(e.to_string()))?;

        let tls = TlsConnector::new();
        let tls_stream = tls.connect(&self.host, tcp_stream).await?;

        let client = async_imap::Client::new(tls_stream);
        let session = client
            .login(
                &self.credentials.username,
                self.credentials.password.expose_secret(),
            )
            .await
            .map_err(|(e, _)| EmailError::AuthenticationFailed(e.to_string()))?;

        info!("Successfully authenticated as {}", self.credentials.username);
        self.session = Some(session);

        if let Err(e) = self.select_folder().await {
            if let Some(mut session) = self.session.take() {
                if let Err(logout_err) = session.logout().await {
                    warn!("Logout after failed select also failed: {}", logout_err);
                }
            }
            return Err(e);
        }

        Ok(())
    }

    /// Selects the configured folder and returns its message count.
    async fn select_folder(&mut self) -> Result<u32> {
        let folder = self.folder.clone();
        let session = self.session_mut()?;

        info!("Selecting folder: {}", folder);

        let mailbox = session.select(&folder).await.map_err(|e| {
            if e.to_string().contains("Mailbox doesn't exist") || e.to_string().contains("NO") {
                EmailError::FolderNotFound(folder.clone())
            } else {
                EmailError::ProtocolError(e.to_string())
            }
        })?;

        debug!("Folder '{}' holds {} messages", folder, mailbox.exists);
        Ok(mailbox.exists)
    }

    fn session_mut(&mut self) -> Result<&mut Session<TlsStream>> {
        self.session
            .as_mut()
            .ok_or_else(|| EmailError::ConnectionFailed("Not connected".to_string()))
    }

    /// Closes the selected folder and logs out.
    ///
    /// Logout is attempted even when CLOSE fails; the first error is returned.
    pub async fn disconnect(&mut self) -> Result<()> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };

        info!("Disconnecting from IMAP server");
        let closed = session
            .close()
            .await
            .map_err(|e| EmailError::ProtocolError(e.to_string()));
        let logged_out = session
            .logout()
            .await
            .map_err(|e| EmailError::ProtocolError(e.to_string()));

        closed.and(logged_out)
    }

    /// Checks if the client is currently connected.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }
}

#[async_trait(?Send)]
impl MailSource for ImapClient {
    async fn search(&mut self, query: &SearchQuery) -> Result<Vec<u32>> {
        let query = query.to_imap();
        let session = self.session_mut()?;

        debug!("Searching with query: {}", query);
        let uids = session
            .uid_search(&query)
            .await
            .map_err(|e| EmailError::ProtocolError(e.to_string()))?;

        let uid_list: Vec<u32> = uids.into_iter().collect();
        debug!("Found {} messages matching search", uid_list.len());
        Ok(uid_list)
    }

    /// Fetches with BODY.PEEK[] so scanning does not mark messages as read.
    async fn fetch(&mut self, uid: u32) -> Result<Vec<u8>> {
        let session = self.session_mut()?;

        debug!("Fetching email with UID {}", uid);
        let messages: Vec<_> = session
            .uid_fetch(uid.to_string(), "BODY.PEEK[]")
            .await
            .map_err(|e| EmailError::ProtocolError(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| EmailError::ProtocolError(e.to_string()))?;

        let message = messages
            .first()
            .ok_or(EmailError::MessageNotFound(uid))?;
        let body = message
            .body()
            .ok_or_else(|| EmailError::ProtocolError("Message has no body".to_string()))?;

        Ok(body.to_vec())
    }

    async fn close(&mut self) -> Result<()> {
        self.disconnect().await
    }
}

impl Drop for ImapClient {
    fn drop(&mut self) {
        if self.session.is_some() {
            warn!("ImapClient dropped without explicit disconnect - session will be closed");
        }
    }
}
