//! Pure Java contract interfaces
//!
//! Java interfaces can extend any number of interfaces, so secondary
//! parents become plain `extends` entries and inherited members never need
//! to be repeated. The mixin base has no contract of its own and is skipped.

use super::{type_list, AttributePair, Backend, InterfaceContext, UnitBuilder, INDENT};
use crate::analysis::{CallbackInfo, OperationInfo};
use crate::emitter::MultiEmitter;
use crate::java::{getter_name, setter_name, Flavor};
use crate::synthesis::{constructor_factories, factory_methods, typed_array_factories};
use crate::templates::{TemplateLoader, CALLBACK_TEMPLATE, INTERFACE_TEMPLATE};
use crate::CodegenError;
use interlace_core::types::is_collection_type;
use interlace_core::{Constant, Interface};
use std::fmt::Write;
use tracing::debug;

pub struct InterfacesBackend {
    templates: TemplateLoader,
    unit: Option<UnitBuilder>,
}

impl InterfacesBackend {
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

    fn emit_operation(
        &mut self,
        ctx: &InterfaceContext<'_>,
        info: &OperationInfo,
    ) -> Result<(), CodegenError> {
        let types = ctx.types;
        let unit = self.unit(ctx)?;
        let return_type = unit.java_type(&types, &info.return_type, Flavor::Interface);
        for overload in info.overloads.iter().filter(|o| !o.inherited) {
            let (params, _) = unit.params(&types, &overload.params, Flavor::Interface);
            unit.member(format!(
                "{}{} {}({});",
                INDENT, return_type.name, info.name, params
            ));
        }
        Ok(())
    }

    fn synthesize(&mut self, ctx: &InterfaceContext<'_>) -> Result<(), CodegenError> {
        let config = ctx.config;
        let types = ctx.types;

        if ctx.id() == config.factory_root {
            let unit = self.unit(ctx)?;
            for factory in factory_methods(ctx.graph, &config.factory_naming) {
                let element = unit.java_type(&types, &factory.element, Flavor::Interface);
                unit.member(format!("{}{} {}();", INDENT, element.name, factory.method));
            }
        }

        if ctx.id() == config.global_root {
            let typed_arrays = typed_array_factories(ctx.graph, &config.global_root)?;
            let constructors = constructor_factories(ctx.graph);
            let unit = self.unit(ctx)?;
            for factory in typed_arrays {
                let array = unit.java_type(&types, &factory.interface, Flavor::Interface);
                let list = unit.java_type(&types, factory.list_type, Flavor::Interface);
                let buffer = unit.java_type(&types, "ArrayBuffer", Flavor::Interface);
                let method = factory.method();
                let mut text = String::new();
                writeln!(text, "{}{} {}(int length);", INDENT, array.name, method)?;
                writeln!(text)?;
                writeln!(text, "{}{} {}({} list);", INDENT, array.name, method, list.name)?;
                writeln!(text)?;
                write!(
                    text,
                    "{}{} {}({} buffer, int byteOffset, int length);",
                    INDENT, array.name, method, buffer.name
                )?;
                unit.member(text);
            }
            for constructor in constructors {
                let created = unit.java_type(&types, &constructor.interface_id, Flavor::Interface);
                for overload in &constructor.overloads {
                    let (params, _) = unit.params(&types, overload, Flavor::Interface);
                    unit.member(format!(
                        "{}{} new{}({});",
                        INDENT, created.name, constructor.interface_id, params
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Backend for InterfacesBackend {
    fn name(&self) -> &'static str {
        "interfaces"
    }

    fn accepts(&self, ctx: &InterfaceContext<'_>) -> bool {
        !ctx.is_mixin_base()
    }

    fn start_interface(&mut self, ctx: &InterfaceContext<'_>) -> Result<(), CodegenError> {
        let types = ctx.types;
        let module = types.module_of(ctx.interface);
        let mut unit = UnitBuilder::new(ctx.id(), types.interface_package(module));

        let mut extends = Vec::new();
        if let Some(primary) = ctx.interface.primary_parent() {
            let id = &primary.type_.id;
            if ctx.graph.has_interface(id) || is_collection_type(id) {
                extends.push(unit.java_type(&types, id, Flavor::Interface).name);
            }
        }
        for name in &ctx.implements {
            extends.push(unit.java_type(&types, name, Flavor::Interface).name);
        }

        unit.declaration = format!("public interface {}", ctx.id());
        if !extends.is_empty() {
            write!(unit.declaration, " extends {}", type_list(&extends))?;
        }
        self.unit = Some(unit);
        Ok(())
    }

    fn add_constant(
        &mut self,
        ctx: &InterfaceContext<'_>,
        constant: &Constant,
    ) -> Result<(), CodegenError> {
        let types = ctx.types;
        let unit = self.unit(ctx)?;
        let java_type = unit.java_type(&types, &constant.type_.id, Flavor::Interface);
        unit.member(format!(
            "{}static final {} {} = {};",
            INDENT, java_type.name, constant.id, constant.value
        ));
        Ok(())
    }

    fn add_attribute(
        &mut self,
        ctx: &InterfaceContext<'_>,
        pair: &AttributePair<'_>,
    ) -> Result<(), CodegenError> {
        let types = ctx.types;
        let unit = self.unit(ctx)?;
        if let Some(getter) = pair.getter.filter(|_| !pair.inherited_getter) {
            let java_type = unit.java_type(&types, &getter.type_.id, Flavor::Interface);
            let name = getter_name(getter.dom_name(), &java_type);
            unit.member(format!("{}{} {}();", INDENT, java_type.name, name));
        }
        if let Some(setter) = pair.setter.filter(|_| !pair.inherited_setter) {
            let java_type = unit.java_type(&types, &setter.type_.id, Flavor::Interface);
            unit.member(format!(
                "{}void {}({} arg);",
                INDENT,
                setter_name(setter.dom_name()),
                java_type.name
            ));
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
        let java_type = unit.java_type(&types, element_type, Flavor::Interface);
        unit.member(format!("{}{} at(int index);", INDENT, java_type.name));
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
        self.emit_operation(ctx, info)
    }

    fn add_static_operation(
        &mut self,
        ctx: &InterfaceContext<'_>,
        info: &OperationInfo,
        _inherited: bool,
    ) -> Result<(), CodegenError> {
        debug!("{}.{} is static, left to the overlay class", ctx.id(), info.name);
        Ok(())
    }

    fn add_secondary_attribute(
        &mut self,
        _ctx: &InterfaceContext<'_>,
        _owner: &Interface,
        _pair: &AttributePair<'_>,
    ) -> Result<(), CodegenError> {
        Ok(())
    }

    fn add_secondary_operation(
        &mut self,
        _ctx: &InterfaceContext<'_>,
        _owner: &Interface,
        _info: &OperationInfo,
    ) -> Result<(), CodegenError> {
        Ok(())
    }

    fn finish_interface(
        &mut self,
        ctx: &InterfaceContext<'_>,
        emitter: &mut MultiEmitter,
    ) -> Result<(), CodegenError> {
        self.synthesize(ctx)?;
        let unit = self.unit.take().ok_or_else(|| {
            CodegenError::Generation(format!("{} finished before start_interface", ctx.id()))
        })?;
        unit.render(&self.templates, INTERFACE_TEMPLATE, emitter)
    }

    fn process_callback(
        &mut self,
        ctx: &InterfaceContext<'_>,
        callback: &CallbackInfo,
        emitter: &mut MultiEmitter,
    ) -> Result<(), CodegenError> {
        let types = ctx.types;
        let module = types.module_of(ctx.interface);
        let mut unit = UnitBuilder::new(&callback.interface_id, types.interface_package(module));
        unit.declaration = format!("public interface {}", callback.interface_id);

        let info = &callback.operation;
        let return_type = unit.java_type(&types, &info.return_type, Flavor::Interface);
        for overload in &info.overloads {
            let (params, _) = unit.params(&types, &overload.params, Flavor::Interface);
            unit.member(format!(
                "{}{} {}({});",
                INDENT, return_type.name, info.name, params
            ));
        }
        unit.render(&self.templates, CALLBACK_TEMPLATE, emitter)
    }
}
