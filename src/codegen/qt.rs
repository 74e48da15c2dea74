//! Emitter for Python Qt widget bindings (PyQt5/6, PySide2/6).
//!
//! All bindings of this shape share the same API surface, so the only
//! per-binding input is the descriptor: import lines and UI strings.
//!
//! Generated state is staged in two places. Controls hold the values being
//! edited; the persistence object holds the last saved values. `staged()`
//! snapshots the controls, `check()` validates the snapshot, and
//! `commit()` copies it into the persistence object and saves. Cancel and
//! window close reload the controls from the persistence object.
use crate::binding::{BindingDescriptor, UiStrings};
use crate::codegen::python::{self, str_lit};
use crate::codegen::{EmitOptions, Emitted, Emitter, SourceWriter};
use crate::ir::{FieldKind, FieldNode, FormSpec, GroupNode};
use crate::lower::{self, Section};

pub const SHAPE: &str = "python-qt-widgets";

pub const IMPORT_TEMPLATES: &[&str] = &[
    "from {module}.QtWidgets import *",
    "from {module}.QtCore import *",
    "from {module}.QtGui import *",
];

/// Members of the generated classes (and of `QWidget`) a field id must not shadow.
/// Qt calls the virtuals back with arguments, so a zero-argument accessor
/// overriding one breaks the dialog at runtime.
const MEMBERS: &[&str] = &[
    // generated
    "payload", "commit", "save", "reset", "check", "staged",
    "on_button_save_clicked", "on_button_cancel_clicked",
    // QWidget / QObject methods the dialog calls
    "close", "show", "hide", "update", "resize", "move", "size", "width", "height",
    "layout", "setLayout", "parent", "font", "children", "isVisible", "setWindowTitle",
    // QWidget / QObject virtuals
    "event", "eventFilter", "customEvent", "childEvent", "timerEvent",
    "connectNotify", "disconnectNotify",
    "sizeHint", "minimumSizeHint", "setVisible", "metric", "heightForWidth",
    "hasHeightForWidth", "inputMethodQuery", "paintEngine", "initPainter",
    "sharedPainter", "redirected", "focusNextPrevChild", "nativeEvent",
    "actionEvent", "changeEvent", "closeEvent", "contextMenuEvent",
    "dragEnterEvent", "dragLeaveEvent", "dragMoveEvent", "dropEvent",
    "enterEvent", "leaveEvent", "focusInEvent", "focusOutEvent",
    "hideEvent", "showEvent", "inputMethodEvent", "keyPressEvent", "keyReleaseEvent",
    "mouseDoubleClickEvent", "mouseMoveEvent", "mousePressEvent", "mouseReleaseEvent",
    "moveEvent", "paintEvent", "resizeEvent", "tabletEvent", "wheelEvent",
];

pub fn factory(descriptor: &BindingDescriptor) -> Box<dyn Emitter> {
    Box::new(QtWidgetsEmitter { descriptor: descriptor.clone() })
}

pub struct QtWidgetsEmitter {
    descriptor: BindingDescriptor,
}

impl Emitter for QtWidgetsEmitter {
    fn descriptor(&self) -> &BindingDescriptor {
        &self.descriptor
    }

    fn reserved_names(&self) -> &'static [&'static str] {
        static RESERVED: once_cell::sync::Lazy<Vec<&'static str>> = once_cell::sync::Lazy::new(|| {
            python::KEYWORDS.iter().chain(MEMBERS).copied().collect()
        });
        RESERVED.as_slice()
    }

    fn emit(&self, spec: &FormSpec, options: &EmitOptions) -> Emitted {
        let strings = self.descriptor.strings_for(&spec.language);
        let fields = lower::fields(spec);
        Emitted {
            persistence_imports: persistence_imports(),
            persistence: persistence_class(spec, &fields, options),
            dialog_imports: self.dialog_imports(options),
            dialog: dialog_class(spec, &fields, strings, options),
        }
    }
}

impl QtWidgetsEmitter {
    fn dialog_imports(&self, options: &EmitOptions) -> Vec<String> {
        let mut lines = vec!["from typing import Callable".to_string(), String::new()];
        lines.extend(self.descriptor.import_lines());
        if let Some(module) = &options.data_module {
            lines.push(String::new());
            lines.push(format!("from {module} import {}", options.data_name));
        }
        lines
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PERSISTENCE CLASS
// ————————————————————————————————————————————————————————————————————————————

fn persistence_imports() -> Vec<String> {
    ["import json", "import os", "import traceback"].map(String::from).to_vec()
}

fn persistence_class(spec: &FormSpec, fields: &[&FieldNode], options: &EmitOptions) -> Vec<String> {
    let data = &options.data_name;
    let window = &options.window_name;
    let mut w = SourceWriter::new(python::INDENT);

    w.block(format!("class {data}:"), "pass", |w| {
        w.line("\"\"\"");
        w.line("ATTENTION:");
        w.line(format!("1. Don't use `{data}` in your own code. It can only be used in `{window}`."));
        w.line(format!("2. Don't call `commit` or `save` of any `{data}`. `{window}` will control it."));
        w.line("\"\"\"");

        w.block("def __init__(self):", "pass", |w| {
            w.line("# set config path");
            w.line(format!("self.__config_path = os.path.abspath({})", str_lit(&spec.config_path)));
            w.line("# load config");
            w.line("config_data = {}");
            w.line("file_exist = True");
            w.block("try:", "pass", |w| {
                w.block("with open(self.__config_path, 'r', encoding='utf-8') as f:", "pass", |w| {
                    w.line("config_data = json.load(f)");
                });
            });
            w.block("except FileNotFoundError:", "pass", |w| {
                w.line("file_exist = False");
            });
            w.block("except Exception:", "pass", |w| {
                w.line("traceback.print_exc()");
            });
            w.block("if not isinstance(config_data, dict):", "pass", |w| {
                w.line("config_data = {}");
            });
            w.line("# init config data");
            for f in fields {
                w.line(format!(
                    "self.{} = config_data.get({}, {})",
                    f.id,
                    str_lit(&f.name),
                    python::default_lit(&f.kind)
                ));
            }
            w.line("# init config file");
            w.block("if not file_exist:", "pass", |w| {
                w.line("self.save()");
            });
        });
        w.blank();

        w.block("def payload(self) -> dict:", "pass", |w| {
            if fields.is_empty() {
                w.line("return {}");
                return;
            }
            w.block("return {", "", |w| {
                for f in fields {
                    w.line(format!("{}: self.{},", str_lit(&f.name), f.id));
                }
            });
            w.line("}");
        });
        w.blank();

        w.block("def commit(self, staged: dict):", "pass", |w| {
            for f in fields {
                w.line(format!("self.{0} = staged[{1}]", f.id, str_lit(&f.id)));
            }
            w.line("self.save()");
        });
        w.blank();

        w.block("def save(self):", "pass", |w| {
            w.block("try:", "pass", |w| {
                w.line("config_dir = os.path.dirname(self.__config_path)");
                w.block("if not os.path.exists(config_dir):", "pass", |w| {
                    w.line("os.makedirs(config_dir)");
                });
                w.line("content = json.dumps(self.payload(), ensure_ascii=False)");
                w.block("with open(self.__config_path, 'w', encoding='utf-8') as f:", "pass", |w| {
                    w.line("f.write(content)");
                });
            });
            w.block("except Exception:", "pass", |w| {
                w.line("traceback.print_exc()");
            });
        });
    });

    w.into_lines()
}

// ————————————————————————————————————————————————————————————————————————————
// DIALOG CLASS
// ————————————————————————————————————————————————————————————————————————————

fn control(f: &FieldNode) -> String {
    match f.kind {
        FieldKind::Text { .. } => format!("self.__line_edit_{}", f.id),
        FieldKind::Number { .. } => format!("self.__spin_box_{}", f.id),
    }
}

fn label(f: &FieldNode) -> String {
    format!("self.__label_{}", f.id)
}

fn dialog_class(spec: &FormSpec, fields: &[&FieldNode], strings: &UiStrings, options: &EmitOptions) -> Vec<String> {
    let data = &options.data_name;
    let window = &options.window_name;
    let mut w = SourceWriter::new(python::INDENT);

    w.block(format!("class {window}(QWidget):"), "pass", |w| {
        w.line("\"\"\"");
        w.line("ATTENTION:");
        w.line(format!("1. Get config data by getters in `{window}` instead of `__config_data.*`."));
        w.line(format!("2. Use `{window}` from the GUI thread only. `config_changed` is called synchronously"));
        w.line("   after a successful save, before the window closes.");
        w.line("\"\"\"");

        w.block("def __init__(self, config_changed: Callable[[], None]):", "pass", |w| {
            w.line("\"\"\"");
            w.line(":param config_changed: function to call when config is changed");
            w.line("\"\"\"");
            w.line("super().__init__()");
            w.line(format!("self.__config_data = {data}()"));
            w.line("self.__config_changed = config_changed");
            w.line(format!("self.setWindowTitle({})", str_lit(&spec.title)));
            w.line(format!("self.resize({}, {})", spec.width, spec.height));
            w.line(format!("self.setFixedSize({}, {})", spec.width, spec.height));
            w.line("self.setWindowModality(Qt.WindowModality.ApplicationModal)");
            w.blank();

            for f in fields {
                controls(w, f);
            }
            buttons(w, strings);
            w.line("self.reset()");
            w.blank();

            layout(w, spec);
        });
        w.blank();

        w.block("def on_button_save_clicked(self):", "pass", |w| {
            w.line("staged = self.__staged()");
            w.line("# check input");
            w.block("if not self.check(staged):", "pass", |w| {
                w.line("return");
            });
            w.line("# commit staged values and save config");
            w.line("self.__config_data.commit(staged)");
            w.line("# call config_changed");
            w.line("self.__config_changed()");
            w.line("# close window");
            w.line("self.close()");
        });
        w.blank();

        w.block("def on_button_cancel_clicked(self):", "pass", |w| {
            w.line("self.reset()");
            w.line("self.close()");
        });
        w.blank();

        w.block("def closeEvent(self, a0: QCloseEvent):", "pass", |w| {
            w.line("self.reset()");
            w.line("a0.accept()");
        });
        w.blank();

        w.block("def reset(self):", "pass", |w| {
            w.line("\"\"\"");
            w.line("discard unsaved edits by loading every control from the saved config");
            w.line("\"\"\"");
            for f in fields {
                let setter = match f.kind {
                    FieldKind::Text { .. } => "setText",
                    FieldKind::Number { .. } => "setValue",
                };
                w.line(format!("{}.{setter}(self.__config_data.{})", control(f), f.id));
            }
        });
        w.blank();

        w.block("def check(self, staged: dict) -> bool:", "pass", |w| {
            w.line("\"\"\"");
            w.line("check staged input, show the first error in a message box and return whether input is valid");
            w.line(":param staged: control values keyed by field id");
            w.line(":return: True if input is valid, False otherwise");
            w.line("\"\"\"");
            for f in fields {
                validation(w, f, strings);
            }
            w.line("return True");
        });
        w.blank();

        w.block("def __staged(self) -> dict:", "pass", |w| {
            if fields.is_empty() {
                w.line("return {}");
                return;
            }
            w.block("return {", "", |w| {
                for f in fields {
                    let getter = match f.kind {
                        FieldKind::Text { .. } => "text",
                        FieldKind::Number { .. } => "value",
                    };
                    w.line(format!("{}: {}.{getter}(),", str_lit(&f.id), control(f)));
                }
            });
            w.line("}");
        });

        for f in fields {
            w.blank();
            w.block(format!("def {}(self) -> {}:", f.id, python::type_name(&f.kind)), "pass", |w| {
                w.line(format!("return self.__config_data.{}", f.id));
            });
        }
    });

    w.into_lines()
}

fn controls(w: &mut SourceWriter, f: &FieldNode) {
    let control = control(f);
    w.line(format!("{} = QLabel({})", label(f), str_lit(&f.label)));
    match &f.kind {
        FieldKind::Text { placeholder, max_length, .. } => {
            w.line(format!("{control} = QLineEdit(self)"));
            if !placeholder.is_empty() {
                w.line(format!("{control}.setPlaceholderText({})", str_lit(placeholder)));
            }
            w.line(format!("{control}.setMaxLength({max_length})"));
        }
        FieldKind::Number { min, max, step, .. } => {
            w.line(format!("{control} = QSpinBox(self)"));
            w.line(format!("{control}.setRange({min}, {max})"));
            w.line(format!("{control}.setSingleStep({step})"));
        }
    }
}

fn buttons(w: &mut SourceWriter, strings: &UiStrings) {
    for (name, text) in [("save", &strings.save), ("cancel", &strings.cancel)] {
        w.line(format!("self.__button_{name} = QPushButton(self)"));
        w.line(format!("self.__button_{name}.setText({})", str_lit(text)));
        w.line(format!("self.__button_{name}.clicked.connect(self.on_button_{name}_clicked)"));
    }
}

fn layout(w: &mut SourceWriter, spec: &FormSpec) {
    w.line("layout_self = QVBoxLayout()");
    for section in lower::sections(spec) {
        match section {
            Section::Fields { index, fields } => {
                let name = format!("layout_form_{index}");
                w.line(format!("{name} = QFormLayout()"));
                for f in fields {
                    w.line(format!("{name}.addRow({}, {})", label(f), control(f)));
                }
                w.line(format!("layout_self.addLayout({name})"));
            }
            Section::Group(group) => group_box(w, group),
        }
    }
    w.line("layout_button = QHBoxLayout()");
    w.line("layout_button.setAlignment(Qt.AlignmentFlag.AlignRight)");
    w.line("layout_button.addWidget(self.__button_save)");
    w.line("layout_button.addWidget(self.__button_cancel)");
    w.line("layout_self.addLayout(layout_button)");
    w.line("self.setLayout(layout_self)");
}

fn group_box(w: &mut SourceWriter, group: &GroupNode) {
    let boxed = format!("self.__group_box_{}", group.id);
    let inner = format!("layout_group_box_{}", group.id);
    w.line(format!("{boxed} = QGroupBox({})", str_lit(&group.label)));
    w.line(format!("{inner} = QFormLayout()"));
    for f in &group.items {
        w.line(format!("{inner}.addRow({}, {})", label(f), control(f)));
    }
    w.line(format!("{boxed}.setLayout({inner})"));
    w.line(format!("layout_self.addWidget({boxed})"));
}

/// Only text fields with a positive minimum need a check; spin boxes
/// cannot hold out-of-range values.
fn validation(w: &mut SourceWriter, f: &FieldNode, strings: &UiStrings) {
    let FieldKind::Text { min_length, .. } = f.kind else {
        return;
    };
    if min_length == 0 {
        return;
    }
    w.block(format!("if len(staged[{}]) < {min_length}:", str_lit(&f.id)), "pass", |w| {
        w.line(format!(
            "QMessageBox.warning(self, {}, {})",
            str_lit(&strings.warning_title),
            str_lit(&strings.min_length_message(&f.label, min_length))
        ));
        w.line("return False");
    });
}
