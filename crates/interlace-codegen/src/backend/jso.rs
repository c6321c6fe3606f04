//! JavaScriptObject overlay classes
//!
//! Each interface `X` becomes `JsX extends JsP implements X`, where `P` is
//! the primary parent or, for roots, the mixin base. Overlay methods are
//! `final`, so members an ancestor already declares are never repeated, and
//! members of mixins are only emitted once, on the mixin base.

use super::{type_list, AttributePair, Backend, InterfaceContext, UnitBuilder, INDENT};
use crate::analysis::{CallbackInfo, OperationInfo};
use crate::emitter::MultiEmitter;
use crate::java::{getter_name, setter_name, Flavor, JavaType, JSO_PREFIX};
use crate::synthesis::{
    constructor_factories, factory_methods, typed_array_factories, FactoryMethod, PrefixGroup,
};
use crate::templates::{TemplateLoader, JSO_TEMPLATE};
use crate::CodegenError;
use interlace_core::types::strip_modules;
use interlace_core::{Attribute, Constant, Interface};
use std::collections::BTreeSet;
use std::fmt::Write;

const JAVASCRIPT_OBJECT: &str = "com.google.gwt.core.client.JavaScriptObject";
const EVENT_LISTENER: &str = "EventListener";

pub struct JsoBackend {
    templates: TemplateLoader,
    unit: Option<UnitBuilder>,
}

/// JNI type descriptor used in JSNI method references
fn jni_descriptor(java_type: &JavaType) -> String {
    match java_type.name.as_str() {
        "int" => "I".to_string(),
        "double" => "D".to_string(),
        "float" => "F".to_string(),
        "boolean" => "Z".to_string(),
        "byte" => "B".to_string(),
        "void" => "V".to_string(),
        "String" => "Ljava/lang/String;".to_string(),
        _ => match &java_type.import {
            Some(path) => format!("L{};", path.replace('.', "/")),
            None => "Ljava/lang/Object;".to_string(),
        },
    }
}

impl JsoBackend {
    pub fn new(templates: TemplateLoader) -> Self {
        Self {
            templates,
            unit: None,
        }
    }

    fn unit(&mut self, ctx: &InterfaceContext<'_>) -> Result<&mut UnitBuilder, CodegenError> {
        self.unit.as_mut().ok_or_else(|| {
            CodegenError::Generation(format!("{} used before start_interface", ctx.id()))
        })
    }

    /// JSNI reference to a static helper on the mixin base overlay
    fn mixin_base_ref(ctx: &InterfaceContext<'_>) -> String {
        let base = ctx.types.map(&ctx.config.mixin_base, Flavor::JsoReturn);
        let class = base
            .import
            .unwrap_or_else(|| format!("{}{}", JSO_PREFIX, ctx.config.mixin_base));
        format!("@{}", class)
    }

    fn emit_getter(
        &mut self,
        ctx: &InterfaceContext<'_>,
        getter: &Attribute,
    ) -> Result<(), CodegenError> {
        let types = ctx.types;
        let listener = strip_modules(&getter.type_.id) == EVENT_LISTENER;
        let base_ref = Self::mixin_base_ref(ctx);
        let unit = self.unit(ctx)?;
        let java_type = unit.java_type(&types, &getter.type_.id, Flavor::JsoReturn);
        let name = getter_name(getter.dom_name(), &java_type);

        let mut text = String::new();
        writeln!(text, "{}public final native {} {}() /*-{{", INDENT, java_type.name, name)?;
        if listener {
            writeln!(
                text,
                "{0}{0}return {1}::getListenerFor(L{2};)(this.{3});",
                INDENT,
                base_ref,
                JAVASCRIPT_OBJECT.replace('.', "/"),
                getter.id
            )?;
        } else {
            writeln!(text, "{0}{0}return this.{1};", INDENT, getter.id)?;
        }
        write!(text, "{}}}-*/;", INDENT)?;
        unit.member(text);
        Ok(())
    }

    fn emit_setter(
        &mut self,
        ctx: &InterfaceContext<'_>,
        setter: &Attribute,
    ) -> Result<(), CodegenError> {
        let types = ctx.types;
        let listener = strip_modules(&setter.type_.id) == EVENT_LISTENER;
        let base_ref = Self::mixin_base_ref(ctx);
        let unit = self.unit(ctx)?;
        let java_type = unit.java_type(&types, &setter.type_.id, Flavor::JsoParam);
        let name = setter_name(setter.dom_name());

        let mut text = String::new();
        if listener {
            writeln!(
                text,
                "{}public final native void {}({} listener) /*-{{",
                INDENT, name, java_type.name
            )?;
            writeln!(
                text,
                "{0}{0}this.{1} = {2}::getHandlerFor({3})(listener);",
                INDENT,
                setter.id,
                base_ref,
                jni_descriptor(&java_type)
            )?;
        } else {
            let param = format!("param_{}", setter.id);
            writeln!(
                text,
                "{}public final native void {}({} {}) /*-{{",
                INDENT, name, java_type.name, param
            )?;
            writeln!(text, "{0}{0}this.{1} = {2};", INDENT, setter.id, param)?;
        }
        write!(text, "{}}}-*/;", INDENT)?;
        unit.member(text);
        Ok(())
    }

    /// Emit every non-inherited overload; `receiver` is the JavaScript
    /// expression the method is called on
    fn emit_operation(
        &mut self,
        ctx: &InterfaceContext<'_>,
        info: &OperationInfo,
        receiver: &str,
        skip_inherited: bool,
    ) -> Result<(), CodegenError> {
        let types = ctx.types;
        let unit = self.unit(ctx)?;
        let return_type = unit.java_type(&types, &info.return_type, Flavor::JsoReturn);
        let modifiers = if info.is_static {
            "public static native"
        } else {
            "public final native"
        };
        for overload in &info.overloads {
            if skip_inherited && overload.inherited {
                continue;
            }
            let (params, args) = unit.params(&types, &overload.params, Flavor::JsoParam);
            let call = format!("{}.{}({})", receiver, info.js_name, args);
            let statement = if return_type.is_void() {
                format!("{};", call)
            } else {
                format!("return {};", call)
            };

            let mut text = String::new();
            writeln!(
                text,
                "{}{} {} {}({}) /*-{{",
                INDENT, modifiers, return_type.name, info.name, params
            )?;
            writeln!(text, "{0}{0}{1}", INDENT, statement)?;
            write!(text, "{}}}-*/;", INDENT)?;
            unit.member(text);
        }
        Ok(())
    }

    fn emit_listener_helpers(&mut self, ctx: &InterfaceContext<'_>) -> Result<(), CodegenError> {
        let types = ctx.types;
        let Some(listener) = ctx.graph.get(EVENT_LISTENER) else {
            return Ok(());
        };
        let handle_event = listener.operations.first();
        let unit = self.unit(ctx)?;
        let listener_type = unit.java_type(&types, EVENT_LISTENER, Flavor::Interface);
        unit.imports.add_path(JAVASCRIPT_OBJECT);

        let mut getter = String::new();
        writeln!(
            getter,
            "{}public static native {} getListenerFor(JavaScriptObject handler) /*-{{",
            INDENT, listener_type.name
        )?;
        writeln!(getter, "{0}{0}return handler ? handler.listener || null : null;", INDENT)?;
        write!(getter, "{}}}-*/;", INDENT)?;
        unit.member(getter);

        let mut handler = String::new();
        writeln!(
            handler,
            "{}public static native JavaScriptObject getHandlerFor({} listener) /*-{{",
            INDENT, listener_type.name
        )?;
        writeln!(handler, "{0}{0}if (!listener) {{ return null; }}", INDENT)?;
        if let Some(op) = handle_event {
            let descriptors: Vec<String> = op
                .arguments
                .iter()
                .map(|a| jni_descriptor(&types.map(&a.type_.id, Flavor::Interface)))
                .collect();
            let listener_class = listener_type.import.clone().unwrap_or_default();
            writeln!(
                handler,
                "{0}{0}var handler = function(evt) {{ listener.@{1}::{2}({3})(evt); }};",
                INDENT,
                listener_class,
                op.id,
                descriptors.join("")
            )?;
        } else {
            writeln!(handler, "{0}{0}var handler = function(evt) {{}};", INDENT)?;
        }
        writeln!(handler, "{0}{0}handler.listener = listener;", INDENT)?;
        writeln!(handler, "{0}{0}return handler;", INDENT)?;
        write!(handler, "{}}}-*/;", INDENT)?;
        unit.member(handler);
        Ok(())
    }

    fn emit_factory_methods(
        &mut self,
        ctx: &InterfaceContext<'_>,
        factories: Vec<FactoryMethod>,
    ) -> Result<(), CodegenError> {
        let types = ctx.types;
        let element_root = ctx.config.factory_naming.suffix.clone();
        let unit = self.unit(ctx)?;

        let mut helpers: BTreeSet<String> = BTreeSet::new();
        let groups: Vec<PrefixGroup> = factories
            .iter()
            .filter_map(|f| f.group.clone())
            .filter(|g| helpers.insert(g.helper.clone()))
            .collect();
        for group in groups {
            let element = unit.java_type(&types, &element_root, Flavor::JsoReturn);
            let mut text = String::new();
            writeln!(
                text,
                "{}public final {} {}(String tag) {{",
                INDENT, element.name, group.helper
            )?;
            writeln!(
                text,
                "{0}{0}return createElementNS(\"{1}\", tag).cast();",
                INDENT, group.namespace
            )?;
            write!(text, "{}}}", INDENT)?;
            unit.member(text);
        }

        for factory in factories {
            let element = unit.java_type(&types, &factory.element, Flavor::JsoReturn);
            let creator = factory
                .group
                .as_ref()
                .map(|g| g.helper.as_str())
                .unwrap_or("createElement");
            let mut text = String::new();
            writeln!(
                text,
                "{}public final {} {}() {{",
                INDENT, element.name, factory.method
            )?;
            writeln!(
                text,
                "{0}{0}return {1}(\"{2}\").cast();",
                INDENT, creator, factory.tag
            )?;
            write!(text, "{}}}", INDENT)?;
            unit.member(text);
        }
        Ok(())
    }

    fn emit_global_factories(&mut self, ctx: &InterfaceContext<'_>) -> Result<(), CodegenError> {
        let types = ctx.types;
        let config = ctx.config;
        let typed_arrays = typed_array_factories(ctx.graph, &config.global_root)?;
        let constructors = constructor_factories(ctx.graph);
        let unit = self.unit(ctx)?;

        for factory in typed_arrays {
            let array = unit.java_type(&types, &factory.interface, Flavor::JsoReturn);
            let list = unit.java_type(&types, factory.list_type, Flavor::JsoParam);
            let buffer = unit.java_type(&types, "ArrayBuffer", Flavor::JsoParam);
            let method = factory.method();
            let js = &factory.js_name;
            let mut text = String::new();
            writeln!(
                text,
                "{0}public final native {1} {2}(int length) /*-{{ return new {3}(length); }}-*/;",
                INDENT, array.name, method, js
            )?;
            writeln!(text)?;
            writeln!(
                text,
                "{0}public final native {1} {2}({3} list) /*-{{ return new {4}(list); }}-*/;",
                INDENT, array.name, method, list.name, js
            )?;
            writeln!(text)?;
            write!(
                text,
                "{0}public final native {1} {2}({3} buffer, int byteOffset, int length) /*-{{ return new {4}(buffer, byteOffset, length); }}-*/;",
                INDENT, array.name, method, buffer.name, js
            )?;
            unit.member(text);
        }

        for constructor in constructors {
            let created = unit.java_type(&types, &constructor.interface_id, Flavor::JsoReturn);
            for overload in &constructor.overloads {
                let (params, args) = unit.params(&types, overload, Flavor::JsoParam);
                unit.member(format!(
                    "{0}public final native {1} new{2}({3}) /*-{{ return new {4}({5}); }}-*/;",
                    INDENT, created.name, constructor.interface_id, params, constructor.js_name, args
                ));
            }
        }
        Ok(())
    }
}

impl Backend for JsoBackend {
    fn name(&self) -> &'static str {
        "jso"
    }

    fn start_interface(&mut self, ctx: &InterfaceContext<'_>) -> Result<(), CodegenError> {
        let types = ctx.types;
        let module = types.module_of(ctx.interface);
        let name = format!("{}{}", JSO_PREFIX, ctx.id());
        let mut unit = UnitBuilder::new(&name, types.jso_package(module));

        let superclass = if ctx.is_mixin_base() {
            unit.imports.add_path(JAVASCRIPT_OBJECT);
            "JavaScriptObject".to_string()
        } else {
            let parent = ctx
                .primary_interface()
                .map(|p| p.id.as_str())
                .unwrap_or(ctx.config.mixin_base.as_str());
            unit.java_type(&types, parent, Flavor::JsoReturn).name
        };

        let mut implements = Vec::new();
        if !ctx.is_mixin_base() {
            implements.push(unit.java_type(&types, ctx.id(), Flavor::Interface).name);
        }
        for ancestor in &ctx.implements {
            implements.push(unit.java_type(&types, ancestor, Flavor::Interface).name);
        }

        unit.declaration = format!("public class {} extends {}", name, superclass);
        if !implements.is_empty() {
            write!(unit.declaration, " implements {}", type_list(&implements))?;
        }
        self.unit = Some(unit);
        Ok(())
    }

    fn add_constant(
        &mut self,
        _ctx: &InterfaceContext<'_>,
        _constant: &Constant,
    ) -> Result<(), CodegenError> {
        // Constants are inherited from the implemented interface.
        Ok(())
    }

    fn add_attribute(
        &mut self,
        ctx: &InterfaceContext<'_>,
        pair: &AttributePair<'_>,
    ) -> Result<(), CodegenError> {
        if let Some(getter) = pair.getter.filter(|_| !pair.inherited_getter) {
            self.emit_getter(ctx, getter)?;
        }
        if let Some(setter) = pair.setter.filter(|_| !pair.inherited_setter) {
            self.emit_setter(ctx, setter)?;
        }
        Ok(())
    }

    fn add_indexer(
        &mut self,
        ctx: &InterfaceContext<'_>,
        element_type: &str,
    ) -> Result<(), CodegenError> {
        let types = ctx.types;
        let unit = self.unit(ctx)?;
        let java_type = unit.java_type(&types, element_type, Flavor::JsoReturn);
        let mut text = String::new();
        writeln!(text, "{}public final native {} at(int index) /*-{{", INDENT, java_type.name)?;
        writeln!(text, "{0}{0}return this[index];", INDENT)?;
        write!(text, "{}}}-*/;", INDENT)?;
        unit.member(text);
        Ok(())
    }

    fn add_operation(
        &mut self,
        ctx: &InterfaceContext<'_>,
        info: &OperationInfo,
        inherited: bool,
    ) -> Result<(), CodegenError> {
        if inherited {
            return Ok(());
        }
        self.emit_operation(ctx, info, "this", true)
    }

    fn add_static_operation(
        &mut self,
        ctx: &InterfaceContext<'_>,
        info: &OperationInfo,
        inherited: bool,
    ) -> Result<(), CodegenError> {
        if inherited {
            return Ok(());
        }
        let receiver = format!("$wnd.{}", ctx.interface.binding_name());
        self.emit_operation(ctx, info, &receiver, true)
    }

    fn add_secondary_attribute(
        &mut self,
        ctx: &InterfaceContext<'_>,
        owner: &Interface,
        pair: &AttributePair<'_>,
    ) -> Result<(), CodegenError> {
        if ctx.is_mixin(&owner.id) {
            return Ok(());
        }
        if let Some(getter) = pair.getter {
            self.emit_getter(ctx, getter)?;
        }
        if let Some(setter) = pair.setter {
            self.emit_setter(ctx, setter)?;
        }
        Ok(())
    }

    fn add_secondary_operation(
        &mut self,
        ctx: &InterfaceContext<'_>,
        owner: &Interface,
        info: &OperationInfo,
    ) -> Result<(), CodegenError> {
        if ctx.is_mixin(&owner.id) {
            return Ok(());
        }
        self.emit_operation(ctx, info, "this", false)
    }

    fn finish_interface(
        &mut self,
        ctx: &InterfaceContext<'_>,
        emitter: &mut MultiEmitter,
    ) -> Result<(), CodegenError> {
        if ctx.is_mixin_base() {
            self.emit_listener_helpers(ctx)?;
        }
        if ctx.id() == ctx.config.factory_root {
            let factories = factory_methods(ctx.graph, &ctx.config.factory_naming);
            if factories.iter().any(|f| f.group.is_some()) {
                let root = &ctx.config.factory_naming.suffix;
                if !ctx.graph.has_interface(root) {
                    return Err(CodegenError::missing_interface(
                        root.as_str(),
                        format!("{}.createElementNS", ctx.id()),
                    ));
                }
            }
            self.emit_factory_methods(ctx, factories)?;
        }
        if ctx.id() == ctx.config.global_root {
            self.emit_global_factories(ctx)?;
        }

        let unit = self.unit.take().ok_or_else(|| {
            CodegenError::Generation(format!("{} finished before start_interface", ctx.id()))
        })?;
        unit.render(&self.templates, JSO_TEMPLATE, emitter)
    }

    fn process_callback(
        &mut self,
        _ctx: &InterfaceContext<'_>,
        _callback: &CallbackInfo,
        _emitter: &mut MultiEmitter,
    ) -> Result<(), CodegenError> {
        // Callbacks are implemented in Java, there is no overlay to emit.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jni_descriptors() {
        let cases = vec![
            (JavaType { name: "int".to_string(), import: None }, "I"),
            (JavaType { name: "boolean".to_string(), import: None }, "Z"),
            (JavaType { name: "String".to_string(), import: None }, "Ljava/lang/String;"),
            (
                JavaType {
                    name: "Event".to_string(),
                    import: Some("elemental.events.Event".to_string()),
                },
                "Lelemental/events/Event;",
            ),
        ];

        for (java_type, expected) in cases {
            assert_eq!(jni_descriptor(&java_type), expected, "{}", java_type.name);
        }
    }
}
