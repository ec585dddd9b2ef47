use crate::core::config::data::{path_display, Config};

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.user {
            Some(user) => println!("  user: {user}"),
            None => println!("  user: (unset)"),
        }
        println!("  api-base-url: {}", self.api_base_url());
        match self.history_dir() {
            Some(dir) => println!("  history-dir: {}", path_display(dir)),
            None => println!("  history-dir: (unavailable)"),
        }
        println!(
            "  default-tool: {}",
            self.default_tool().label().to_lowercase()
        );
        println!("  models:");
        println!("    code: {}", self.models.code);
        println!("    text: {}", self.models.text);
        println!("    vision: {}", self.models.vision);
        println!("    image-generation: {}", self.models.image_generation);
        println!("    image-edit: {}", self.models.image_edit);
        println!("    title: {}", self.models.title);
    }
}
