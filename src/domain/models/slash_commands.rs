#[cfg(test)]
#[path = "slash_commands_test.rs"]
mod tests;

pub struct SlashCommand {
    command: String,
    pub args: Vec<String>,
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let mut args = text
            .trim()
            .split(' ')
            .filter(|e| return !e.is_empty())
            .map(|e| return e.to_string())
            .collect::<Vec<String>>();
        if args.is_empty() {
            return None;
        }

        let prefix = args[0].to_string();
        args.remove(0);

        let cmd = SlashCommand {
            command: prefix,
            args,
        };
        if cmd.is_quit()
            || cmd.is_new_chat()
            || cmd.is_mute()
            || cmd.is_history()
            || cmd.is_open()
            || cmd.is_back()
            || cmd.is_close()
            || cmd.is_delete()
            || cmd.is_stats()
            || cmd.is_cleanup()
            || cmd.is_voice()
            || cmd.is_copy()
            || cmd.is_help()
        {
            return Some(cmd);
        }

        return None;
    }

    /// First argument parsed as a number, used by commands that pick an entry
    /// from a numbered list.
    pub fn number_arg(&self) -> Option<usize> {
        return self.args.first().and_then(|e| return e.parse::<usize>().ok());
    }

    pub fn is_quit(&self) -> bool {
        return ["/q", "/quit", "/exit"].contains(&self.command.as_str());
    }

    pub fn is_new_chat(&self) -> bool {
        return ["/n", "/new"].contains(&self.command.as_str());
    }

    pub fn is_mute(&self) -> bool {
        return ["/m", "/mute"].contains(&self.command.as_str());
    }

    pub fn is_history(&self) -> bool {
        return ["/hi", "/history"].contains(&self.command.as_str());
    }

    pub fn is_open(&self) -> bool {
        return ["/o", "/open"].contains(&self.command.as_str());
    }

    pub fn is_back(&self) -> bool {
        return ["/b", "/back"].contains(&self.command.as_str());
    }

    pub fn is_close(&self) -> bool {
        return self.command == "/close";
    }

    pub fn is_delete(&self) -> bool {
        return ["/d", "/delete"].contains(&self.command.as_str());
    }

    pub fn is_stats(&self) -> bool {
        return ["/s", "/stats"].contains(&self.command.as_str());
    }

    pub fn is_cleanup(&self) -> bool {
        return self.command == "/cleanup";
    }

    pub fn is_voice(&self) -> bool {
        return ["/v", "/voice"].contains(&self.command.as_str());
    }

    pub fn is_copy(&self) -> bool {
        return ["/c", "/copy"].contains(&self.command.as_str());
    }

    pub fn is_help(&self) -> bool {
        return ["/h", "/help"].contains(&self.command.as_str());
    }
}
