use crate::error::AppError;
use ssh2::Session;
use std::io::{self, Read};
use std::net::TcpStream;
use std::time::Duration;

/// 一条远程命令的执行结果。
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

/// 在远端执行 shell 命令并取回输出。
///
/// `Err` 只表示通道本身出了问题；命令失败通过 `exit_status` 体现。
pub trait RemoteShell {
    fn exec(&mut self, command: &str) -> Result<CommandOutput, AppError>;
}

/// 单引号包裹路径，内部的 `'` 转义为 `'\''`。
pub fn shell_quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', r"'\''"))
}

pub struct SshShell {
    session: Session,
}

impl SshShell {
    /// 密码登录。不读取 known_hosts，未知主机密钥一律接受。
    pub fn connect(host: &str, port: u16, user: &str, password: &str) -> Result<Self, AppError> {
        tracing::info!("Connecting to NAS at {}:{}...", host, port);
        let tcp = TcpStream::connect((host, port))?;

        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session.handshake()?;
        session.userauth_password(user, password)?;

        if !session.authenticated() {
            return Err(AppError::Remote(format!(
                "Authentication failed for {}@{}",
                user, host
            )));
        }

        tracing::info!("SSH session established with {}", host);
        Ok(Self { session })
    }
}

impl RemoteShell for SshShell {
    fn exec(&mut self, command: &str) -> Result<CommandOutput, AppError> {
        tracing::debug!("SSH exec: {}", command);
        let mut channel = self.session.channel_session()?;
        channel.exec(command)?;

        // 两个流共用一个窗口，必须交替读取，否则 stderr 写满窗口会卡住 stdout
        self.session.set_blocking(false);
        let drained = read_both(&mut channel.stream(0), &mut channel.stderr());
        self.session.set_blocking(true);
        let (stdout, stderr) = drained?;

        channel.wait_close()?;
        let exit_status = channel.exit_status()?;

        Ok(CommandOutput {
            exit_status,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

/// 交替读取两个流直到都到达 EOF。`WouldBlock` 视为暂时没有数据。
fn read_both<O: Read, E: Read>(stdout: &mut O, stderr: &mut E) -> io::Result<(Vec<u8>, Vec<u8>)> {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let mut out_done = false;
    let mut err_done = false;
    let mut buf = [0u8; 8192];

    while !(out_done && err_done) {
        let mut progressed = false;
        if !out_done {
            progressed |= read_chunk(stdout, &mut buf, &mut out, &mut out_done)?;
        }
        if !err_done {
            progressed |= read_chunk(stderr, &mut buf, &mut err, &mut err_done)?;
        }
        if !progressed && !(out_done && err_done) {
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    Ok((out, err))
}

fn read_chunk<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    sink: &mut Vec<u8>,
    done: &mut bool,
) -> io::Result<bool> {
    match reader.read(buf) {
        Ok(0) => {
            *done = true;
            Ok(true)
        }
        Ok(n) => {
            sink.extend_from_slice(&buf[..n]);
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::Interrupted => {
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

impl Drop for SshShell {
    fn drop(&mut self) {
        if let Err(e) = self.session.disconnect(None, "closing", None) {
            tracing::warn!("SSH disconnect failed: {}", e);
        }
        tracing::info!("SSH connection closed.");
    }
}
