use std::path::PathBuf;

pub const PROJECT_DESCRIPTOR_FILE: &str = "CMakeLists.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectTemplate {
    pub name: &'static str,
    pub summary: &'static str,
}

pub const PROJECT_TEMPLATES: [ProjectTemplate; 3] = [
    ProjectTemplate {
        name: "minimal",
        summary: "empty application skeleton",
    },
    ProjectTemplate {
        name: "blinky",
        summary: "LED blink sample",
    },
    ProjectTemplate {
        name: "hello-world",
        summary: "console hello world sample",
    },
];

const MINIMAL_MAIN: &str = "#include <zephyr/kernel.h>\n\nint main(void)\n{\n\treturn 0;\n}\n";

const BLINKY_MAIN: &str = "#include <zephyr/kernel.h>\n#include <zephyr/drivers/gpio.h>\n\n#define SLEEP_TIME_MS 1000\n\nstatic const struct gpio_dt_spec led = GPIO_DT_SPEC_GET(DT_ALIAS(led0), gpios);\n\nint main(void)\n{\n\tif (!gpio_is_ready_dt(&led)) {\n\t\treturn 1;\n\t}\n\tif (gpio_pin_configure_dt(&led, GPIO_OUTPUT_ACTIVE) < 0) {\n\t\treturn 1;\n\t}\n\twhile (1) {\n\t\tgpio_pin_toggle_dt(&led);\n\t\tk_msleep(SLEEP_TIME_MS);\n\t}\n\treturn 0;\n}\n";

const HELLO_MAIN: &str = "#include <zephyr/kernel.h>\n#include <zephyr/sys/printk.h>\n\nint main(void)\n{\n\tprintk(\"Hello from %s\\n\", CONFIG_BOARD);\n\treturn 0;\n}\n";

pub fn template_by_name(name: &str) -> Option<ProjectTemplate> {
    PROJECT_TEMPLATES
        .iter()
        .copied()
        .find(|template| template.name == name)
}

pub fn template_files(template: ProjectTemplate, project_name: &str) -> Vec<(PathBuf, String)> {
    let cmake = format!(
        "cmake_minimum_required(VERSION 3.20.0)\nfind_package(Zephyr REQUIRED HINTS $ENV{{ZEPHYR_BASE}})\nproject({project_name})\n\ntarget_sources(app PRIVATE src/main.c)\n"
    );
    let (prj_conf, main_c) = match template.name {
        "blinky" => ("CONFIG_GPIO=y\n", BLINKY_MAIN),
        "hello-world" => ("CONFIG_PRINTK=y\n", HELLO_MAIN),
        _ => ("# application configuration\n", MINIMAL_MAIN),
    };
    vec![
        (PathBuf::from(PROJECT_DESCRIPTOR_FILE), cmake),
        (PathBuf::from("prj.conf"), prj_conf.to_string()),
        (PathBuf::from("src/main.c"), main_c.to_string()),
    ]
}
