//! Line-oriented command dispatcher on top of `VirtualTree`.
//!
//! Supported commands: `ls [path]`, `cd [path]`, `cp <src> <dest>`, `clear`, `exit`.

use log::warn;

use crate::archive::ArchiveStore;
use crate::audit::AuditLog;
use crate::vfs::VirtualTree;

/// What the front end should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print the text (nothing to print when empty).
    Output(String),
    /// Clear the screen.
    Clear,
    /// End the session.
    Exit,
}

pub struct Shell<S: ArchiveStore> {
    hostname: String,
    tree: VirtualTree<S>,
    audit: AuditLog,
}

impl<S: ArchiveStore> Shell<S> {
    pub fn new<H: Into<String>>(hostname: H, tree: VirtualTree<S>, audit: AuditLog) -> Self {
        Self {
            hostname: hostname.into(),
            tree,
            audit,
        }
    }

    /// Prompt in the `host:cwd$ ` form.
    pub fn prompt(&self) -> String {
        format!("{}:{}$ ", self.hostname, self.tree.cwd().display())
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn tree(&self) -> &VirtualTree<S> {
        &self.tree
    }

    /// Parses and runs one command line.
    pub fn execute(&mut self, line: &str) -> Outcome {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = words.split_first() else {
            return Outcome::Output(String::new());
        };

        match command {
            "ls" => self.ls(args),
            "cd" => self.cd(args),
            "cp" => self.cp(args),
            "clear" => Outcome::Clear,
            "exit" => Outcome::Exit,
            _ => Outcome::Output(format!("{command}: command not found")),
        }
    }

    fn ls(&self, args: &[&str]) -> Outcome {
        let path = match args {
            [] => "",
            [path] => *path,
            _ => return Outcome::Output("ls: too many arguments".to_string()),
        };
        match self.tree.ls(path) {
            Ok(names) => Outcome::Output(names.join("\n")),
            Err(err) => {
                warn!("ls {path}: {err}");
                Outcome::Output(format!("Error: ls: {err}"))
            }
        }
    }

    fn cd(&mut self, args: &[&str]) -> Outcome {
        let path = match args {
            [] => "",
            [path] => *path,
            _ => return Outcome::Output("cd: too many arguments".to_string()),
        };
        match self.tree.cd(path) {
            Ok(cwd) => Outcome::Output(format!("Changed directory to {}", cwd.display())),
            Err(err) => {
                warn!("cd {path}: {err}");
                Outcome::Output(format!("Error: cd: {err}"))
            }
        }
    }

    fn cp(&mut self, args: &[&str]) -> Outcome {
        let [src, dest] = args else {
            return Outcome::Output("Usage: cp <src> <dest>".to_string());
        };
        let event = match self.tree.cp(src, dest) {
            Ok(event) => event,
            Err(err) => {
                warn!("cp {src} {dest}: {err}");
                return Outcome::Output(format!("Error: cp: {err}"));
            }
        };
        // the copy itself has already been committed at this point
        if let Err(err) = self.audit.record(&event) {
            warn!("{err}");
            return Outcome::Output(format!("Warning: {err}"));
        }
        Outcome::Output(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{MemArchive, TarArchive};
    use std::path::Path;
    use tempdir::TempDir;

    fn setup_shell(temp_dir: &TempDir) -> Shell<MemArchive> {
        let archive = MemArchive::new()
            .with_file("test1.txt", b"one")
            .with_file("test2.txt", b"two")
            .with_dir("home/documents")
            .with_dir("home/downloads")
            .with_file("home/test3.txt", b"three")
            .with_dir("info");
        let tree = VirtualTree::build(archive).unwrap();
        let audit = AuditLog::create(temp_dir.path().join("log.csv")).unwrap();
        Shell::new("pc", tree, audit)
    }

    fn output(text: &str) -> Outcome {
        Outcome::Output(text.to_string())
    }

    fn log_lines(temp_dir: &TempDir) -> Vec<String> {
        std::fs::read_to_string(temp_dir.path().join("log.csv"))
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    mod ls {
        use super::*;

        #[test]
        fn test_ls_cwd_and_path() {
            let temp_dir = TempDir::new("shell_test").unwrap();
            let mut shell = setup_shell(&temp_dir);

            assert_eq!(
                shell.execute("ls"),
                output("home\ninfo\ntest1.txt\ntest2.txt")
            );
            assert_eq!(
                shell.execute("ls /home"),
                output("documents\ndownloads\ntest3.txt")
            );
            assert_eq!(shell.execute("ls /home/documents"), output(""));
        }

        #[test]
        fn test_ls_errors() {
            let temp_dir = TempDir::new("shell_test").unwrap();
            let mut shell = setup_shell(&temp_dir);

            assert_eq!(shell.execute("ls /nope"), output("Error: ls: '/nope' not found"));
            assert_eq!(
                shell.execute("ls test1.txt"),
                output("Error: ls: '/test1.txt' not found")
            );
            assert_eq!(shell.execute("ls a b"), output("ls: too many arguments"));
        }
    }

    mod cd {
        use super::*;

        #[test]
        fn test_cd_updates_prompt() {
            let temp_dir = TempDir::new("shell_test").unwrap();
            let mut shell = setup_shell(&temp_dir);
            assert_eq!(shell.prompt(), "pc:/$ ");

            assert_eq!(shell.execute("cd"), output("Changed directory to /"));
            assert_eq!(
                shell.execute("cd /home/downloads"),
                output("Changed directory to /home/downloads")
            );
            assert_eq!(shell.prompt(), "pc:/home/downloads$ ");
            assert_eq!(
                shell.execute("cd ../documents"),
                output("Changed directory to /home/documents")
            );
            assert_eq!(shell.tree().cwd(), Path::new("/home/documents"));
        }

        #[test]
        fn test_cd_errors_keep_cwd() {
            let temp_dir = TempDir::new("shell_test").unwrap();
            let mut shell = setup_shell(&temp_dir);

            assert_eq!(
                shell.execute("cd test1.txt"),
                output("Error: cd: '/test1.txt' not found")
            );
            assert_eq!(shell.execute("cd /x"), output("Error: cd: '/x' not found"));
            assert_eq!(shell.prompt(), "pc:/$ ");
        }
    }

    mod cp {
        use super::*;

        #[test]
        fn test_cp_logs_action() {
            let temp_dir = TempDir::new("shell_test").unwrap();
            let mut shell = setup_shell(&temp_dir);

            assert_eq!(shell.execute("cp test1.txt test3.txt"), output(""));
            assert!(shell.tree().ls("/").unwrap().contains(&"test3.txt".to_string()));

            assert_eq!(
                shell.execute("cp /home/test3.txt /home/downloads/test4.txt"),
                output("")
            );
            assert!(shell
                .tree()
                .ls("/home/downloads")
                .unwrap()
                .contains(&"test4.txt".to_string()));

            let lines = log_lines(&temp_dir);
            assert_eq!(lines.len(), 3);
            assert_eq!(lines[0], "Timestamp,Command,Details");
            assert!(lines[1].ends_with(",cp,test1.txt -> test3.txt"));
            assert!(lines[2].ends_with(",cp,/home/test3.txt -> /home/downloads/test4.txt"));
        }

        #[test]
        fn test_cp_failures_not_logged() {
            let temp_dir = TempDir::new("shell_test").unwrap();
            let mut shell = setup_shell(&temp_dir);

            assert_eq!(
                shell.execute("cp missing.txt copy.txt"),
                output("Error: cp: source '/missing.txt' not found")
            );
            assert_eq!(
                shell.execute("cp test1.txt /nowhere/copy.txt"),
                output("Error: cp: '/nowhere' not found")
            );
            assert_eq!(shell.execute("cp test1.txt"), output("Usage: cp <src> <dest>"));

            assert_eq!(log_lines(&temp_dir).len(), 1);
        }

        #[test]
        fn test_cp_on_tar_archive() {
            let temp_dir = TempDir::new("shell_test").unwrap();
            let mut archive = TarArchive::create(temp_dir.path().join("vfs.tar")).unwrap();
            archive.append_member("home/notes.txt", b"notes").unwrap();
            let tree = VirtualTree::build(archive).unwrap();
            let audit = AuditLog::create(temp_dir.path().join("log.csv")).unwrap();
            let mut shell = Shell::new("box", tree, audit);

            shell.execute("cd home");
            assert_eq!(shell.execute("cp notes.txt notes.bak"), output(""));

            assert_eq!(
                shell.tree().store().read_member("home/notes.bak").unwrap(),
                b"notes"
            );
        }
    }

    #[test]
    fn test_unknown_and_control_commands() {
        let temp_dir = TempDir::new("shell_test").unwrap();
        let mut shell = setup_shell(&temp_dir);

        assert_eq!(shell.execute("rm -rf /"), output("rm: command not found"));
        assert_eq!(shell.execute("   "), output(""));
        assert_eq!(shell.execute("clear"), Outcome::Clear);
        assert_eq!(shell.execute("exit"), Outcome::Exit);
        assert_eq!(shell.hostname(), "pc");
    }
}
