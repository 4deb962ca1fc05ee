use std::collections::HashMap;

use anyhow::bail;
use log::{debug, info};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use rayon::prelude::{IntoParallelIterator, ParallelIterator};

use super::{escaped_ident, field_ident, field_name, variant_name};
use crate::config::GeneratorConfig;
use crate::parser::{Entity, EntityDef, EnumDef, FamilyDef, FieldType, Primitive, StructDef};

pub fn generate_code(entities: Vec<Entity>, config: &GeneratorConfig) -> anyhow::Result<String> {
    let code = entities
        .into_par_iter()
        .map(|entity| generate_entity(entity, config))
        .collect::<anyhow::Result<Vec<_>>>()?;
    info!("generated {} items", code.len());
    Ok(code.join("\n"))
}

fn expand_field_type(field_type: &FieldType) -> TokenStream {
    match field_type {
        FieldType::Named(name) | FieldType::Enum(name) => {
            let ident = format_ident!("{}", name);
            quote!(#ident)
        }
        FieldType::Family(base) => {
            let ident = format_ident!("Any{}", base);
            quote!(#ident)
        }
        FieldType::Array(item_type) => {
            let item_type = expand_field_type(item_type);
            quote!(Vec<#item_type>)
        }
        FieldType::Json => quote!(serde_json::Value),
        FieldType::Simple(primitive) => match primitive {
            Primitive::String => quote!(String),
            Primitive::Int => quote!(i32),
            Primitive::Long => quote!(i64),
            Primitive::Float => quote!(f32),
            Primitive::Double => quote!(f64),
            Primitive::Bool => quote!(bool),
            Primitive::Uuid => quote!(uuid::Uuid),
            Primitive::Bytes => quote!(Vec<u8>),
            Primitive::DateTime => quote!(chrono::DateTime<chrono::FixedOffset>),
            Primitive::Date => quote!(chrono::NaiveDate),
            Primitive::TimeOnly => quote!(chrono::NaiveTime),
            Primitive::Duration => quote!(iso8601_duration::Duration),
        },
    }
}

/// How a stored `Option<T>` is handed out by its getter.
enum Access {
    Copy,
    Str,
    Slice(TokenStream),
    Boxed,
    Borrowed,
}

fn access(field_type: &FieldType) -> Access {
    match field_type {
        FieldType::Simple(Primitive::String) => Access::Str,
        FieldType::Simple(Primitive::Bytes) => Access::Slice(quote!(u8)),
        FieldType::Simple(Primitive::Duration) | FieldType::Json => Access::Borrowed,
        FieldType::Simple(_) | FieldType::Enum(_) => Access::Copy,
        FieldType::Array(item_type) => Access::Slice(expand_field_type(item_type)),
        FieldType::Named(_) | FieldType::Family(_) => Access::Boxed,
    }
}

fn generate_entity(entity: Entity, config: &GeneratorConfig) -> anyhow::Result<String> {
    let ser = config.serialization_path()?;
    debug!("generating {}", entity.name);
    let description = entity.description.as_deref().unwrap_or(&entity.name);
    let code = match &entity.def {
        EntityDef::Struct(def) => generate_struct(&entity.name, description, def, &ser, config),
        EntityDef::Enum(def) => generate_enum(&entity.name, description, def, &ser)?,
        EntityDef::Family(def) => generate_family(&entity.name, description, def, &ser),
    };
    Ok(code.to_string())
}

fn generate_struct(
    name: &str,
    description: &str,
    def: &StructDef,
    ser: &TokenStream,
    config: &GeneratorConfig,
) -> TokenStream {
    let identifier = format_ident!("{}", name);
    let mut fields = Vec::new();
    let mut accessors = Vec::new();

    if let Some(base) = &def.base {
        let base_type = format_ident!("{}", base);
        let base_field = escaped_ident(&field_name(base));
        let base_field_mut = format_ident!("{}_mut", field_name(base));
        let base_doc = format!("The inherited `{base}` part of this value.");
        fields.push(quote! {
            #[serde(flatten)]
            #base_field: #base_type
        });
        accessors.push(quote! {
            #[doc = #base_doc]
            pub fn #base_field(&self) -> &#base_type {
                &self.#base_field
            }
            #[doc = #base_doc]
            pub fn #base_field_mut(&mut self) -> &mut #base_type {
                &mut self.#base_field
            }
            /// Gets the `@odata.type` discriminator stored on the root type.
            pub fn odata_type(&self) -> Option<&str> {
                self.#base_field.odata_type()
            }
            /// Sets the `@odata.type` discriminator stored on the root type.
            pub fn set_odata_type(&mut self, value: Option<String>) {
                self.#base_field.set_odata_type(value)
            }
            /// Gets the additional data captured by the root type.
            pub fn additional_data(&self) -> &#ser::AdditionalData {
                self.#base_field.additional_data()
            }
            pub fn additional_data_mut(&mut self) -> &mut #ser::AdditionalData {
                self.#base_field.additional_data_mut()
            }
            pub fn set_additional_data(&mut self, value: #ser::AdditionalData) {
                self.#base_field.set_additional_data(value)
            }
        });
    }

    for field in &def.properties {
        let wire_name = &field.name;
        let field_name = field_ident(wire_name);
        let setter = format_ident!("set_{}", super::field_name(wire_name));
        let value_type = expand_field_type(&field.field_type);
        let field_doc = field
            .description
            .clone()
            .unwrap_or_else(|| format!("The {wire_name} property"));
        let getter_doc = format!("Gets the `{wire_name}` property value. {field_doc}");
        let setter_doc = format!("Sets the `{wire_name}` property value. {field_doc}");

        let adapter = match field.field_type {
            FieldType::Simple(Primitive::Bytes) => Some("base64_bytes"),
            FieldType::Simple(Primitive::Duration) => Some("iso_duration"),
            _ => None,
        };
        let serde_attr = match adapter {
            Some(adapter) => {
                let with = format!("{}::{adapter}", config.serialization_path);
                quote! {
                    #[serde(
                        rename = #wire_name,
                        default,
                        skip_serializing_if = "Option::is_none",
                        with = #with
                    )]
                }
            }
            None => quote! {
                #[serde(rename = #wire_name, default, skip_serializing_if = "Option::is_none")]
            },
        };

        let access = access(&field.field_type);
        let storage = match access {
            Access::Boxed => quote!(Option<Box<#value_type>>),
            _ => quote!(Option<#value_type>),
        };
        fields.push(quote! {
            #[doc = #field_doc]
            #serde_attr
            #field_name: #storage
        });

        let (getter_type, getter_body) = match access {
            Access::Copy => (quote!(Option<#value_type>), quote!(self.#field_name)),
            Access::Str => (quote!(Option<&str>), quote!(self.#field_name.as_deref())),
            Access::Slice(item_type) => (
                quote!(Option<&[#item_type]>),
                quote!(self.#field_name.as_deref()),
            ),
            Access::Boxed => (
                quote!(Option<&#value_type>),
                quote!(self.#field_name.as_deref()),
            ),
            Access::Borrowed => (
                quote!(Option<&#value_type>),
                quote!(self.#field_name.as_ref()),
            ),
        };
        let setter_body = match field.field_type {
            FieldType::Named(_) | FieldType::Family(_) => {
                quote!(self.#field_name = value.map(Box::new);)
            }
            _ => quote!(self.#field_name = value;),
        };
        accessors.push(quote! {
            #[doc = #getter_doc]
            pub fn #field_name(&self) -> #getter_type {
                #getter_body
            }
            #[doc = #setter_doc]
            pub fn #setter(&mut self, value: Option<#value_type>) {
                #setter_body
            }
        });
    }

    if def.base.is_none() {
        fields.push(quote! {
            /// Stores additional data not described in the OpenAPI description found when
            /// deserializing.
            #[serde(flatten)]
            additional_data: #ser::AdditionalData
        });
        accessors.push(quote! {
            /// Gets the additional data found when deserializing.
            pub fn additional_data(&self) -> &#ser::AdditionalData {
                &self.additional_data
            }
            pub fn additional_data_mut(&mut self) -> &mut #ser::AdditionalData {
                &mut self.additional_data
            }
            pub fn set_additional_data(&mut self, value: #ser::AdditionalData) {
                self.additional_data = value;
            }
        });
    }

    let new_doc = format!("Instantiates a new `{name}` and sets the default values.");
    let constructor = match &def.discriminator_value {
        Some(value) => quote! {
            #[doc = #new_doc]
            pub fn new() -> Self {
                let mut value = Self::default();
                value.set_odata_type(Some(#value.to_string()));
                value
            }
        },
        None => quote! {
            #[doc = #new_doc]
            pub fn new() -> Self {
                Self::default()
            }
        },
    };

    quote! {
        #[doc = #description]
        #[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
        pub struct #identifier {
            #(#fields),*
        }

        impl #identifier {
            #constructor
            #(#accessors)*
        }

        impl #ser::Parsable for #identifier {
            fn odata_type(&self) -> Option<&str> {
                #identifier::odata_type(self)
            }
            fn create_from_discriminator_value(
                node: Option<&#ser::ParseNode>,
            ) -> Result<Self, #ser::SerializationError> {
                match node {
                    Some(node) => node.deserialize(),
                    None => Ok(Self::new()),
                }
            }
        }

        impl #ser::AdditionalDataHolder for #identifier {
            fn additional_data(&self) -> &#ser::AdditionalData {
                #identifier::additional_data(self)
            }
            fn additional_data_mut(&mut self) -> &mut #ser::AdditionalData {
                #identifier::additional_data_mut(self)
            }
            fn set_additional_data(&mut self, value: #ser::AdditionalData) {
                #identifier::set_additional_data(self, value)
            }
        }
    }
}

fn generate_enum(
    name: &str,
    description: &str,
    def: &EnumDef,
    ser: &TokenStream,
) -> anyhow::Result<TokenStream> {
    let identifier = format_ident!("{}", name);
    let values = &def.values;
    let mut seen = HashMap::new();
    let mut variants = Vec::new();
    for value in values {
        let variant = variant_name(value);
        if let Some(previous) = seen.insert(variant.clone(), value) {
            bail!("{name}: values {previous:?} and {value:?} both map to the variant {variant}");
        }
        variants.push(format_ident!("{}", variant));
    }

    Ok(quote! {
        #[doc = #description]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
        pub enum #identifier {
            #(
                #[serde(rename = #values)]
                #variants
            ),*
        }

        impl #identifier {
            /// The value as it appears on the wire.
            pub fn as_str(&self) -> &'static str {
                match self {
                    #(Self::#variants => #values,)*
                }
            }
        }

        impl std::fmt::Display for #identifier {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for #identifier {
            type Err = #ser::SerializationError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    #(#values => Ok(Self::#variants),)*
                    _ => Err(#ser::SerializationError::UnknownEnumValue {
                        enum_name: #name,
                        value: value.to_string(),
                    }),
                }
            }
        }
    })
}

fn generate_family(
    name: &str,
    description: &str,
    def: &FamilyDef,
    ser: &TokenStream,
) -> TokenStream {
    let identifier = format_ident!("{}", name);
    let base = format_ident!("{}", def.base);
    let base_name = &def.base;
    let base_view = escaped_ident(&field_name(&def.base));
    let base_view_mut = format_ident!("{}_mut", field_name(&def.base));
    let property = &def.discriminator_property;
    let base_value = &def.base_discriminator_value;

    let variants = def
        .variants
        .iter()
        .map(|variant| format_ident!("{}", variant.type_name))
        .collect::<Vec<_>>();
    let values = def
        .variants
        .iter()
        .map(|variant| &variant.discriminator_value)
        .collect::<Vec<_>>();
    let views = def
        .variants
        .iter()
        .map(|variant| {
            let segments = variant.base_path.iter().map(|segment| escaped_ident(segment));
            quote!(value #(.#segments())*)
        })
        .collect::<Vec<_>>();
    let views_mut = def
        .variants
        .iter()
        .map(|variant| {
            let segments = variant
                .base_path
                .iter()
                .map(|segment| format_ident!("{}_mut", segment));
            quote!(value #(.#segments())*)
        })
        .collect::<Vec<_>>();
    let base_view_doc = format!("The `{base_name}` part shared by every variant.");

    quote! {
        #[doc = #description]
        #[derive(Debug, Clone, PartialEq)]
        pub enum #identifier {
            #base(#base),
            #(#variants(#variants),)*
        }

        impl #identifier {
            /// Discriminator values that select a subtype rather than the base type.
            pub const DISCRIMINATOR_VALUES: &'static [&'static str] = &[#(#values),*];

            pub fn odata_type(&self) -> Option<&str> {
                match self {
                    Self::#base(value) => value.odata_type(),
                    #(Self::#variants(value) => value.odata_type(),)*
                }
            }

            #[doc = #base_view_doc]
            pub fn #base_view(&self) -> &#base {
                match self {
                    Self::#base(value) => value,
                    #(Self::#variants(value) => #views,)*
                }
            }

            #[doc = #base_view_doc]
            pub fn #base_view_mut(&mut self) -> &mut #base {
                match self {
                    Self::#base(value) => value,
                    #(Self::#variants(value) => #views_mut,)*
                }
            }
        }

        impl Default for #identifier {
            fn default() -> Self {
                Self::#base(#base::new())
            }
        }

        impl From<#base> for #identifier {
            fn from(value: #base) -> Self {
                Self::#base(value)
            }
        }

        #(
            impl From<#variants> for #identifier {
                fn from(value: #variants) -> Self {
                    Self::#variants(value)
                }
            }
        )*

        impl #ser::Parsable for #identifier {
            fn odata_type(&self) -> Option<&str> {
                #identifier::odata_type(self)
            }

            fn create_from_discriminator_value(
                node: Option<&#ser::ParseNode>,
            ) -> Result<Self, #ser::SerializationError> {
                let Some(node) = node else {
                    return Ok(Self::#base(#base::new()));
                };
                let discriminator = match node.get_child_node(#property) {
                    Some(child) => child.get_string_value()?,
                    None => None,
                };
                match discriminator.as_deref() {
                    #(Some(#values) => node.deserialize().map(Self::#variants),)*
                    None | Some(#base_value) => node.deserialize().map(Self::#base),
                    Some(other) => {
                        log::debug!(
                            "unrecognized {} {:?} for {}, falling back to the base type",
                            #property,
                            other,
                            #base_name
                        );
                        node.deserialize().map(Self::#base)
                    }
                }
            }
        }

        impl #ser::AdditionalDataHolder for #identifier {
            fn additional_data(&self) -> &#ser::AdditionalData {
                match self {
                    Self::#base(value) => value.additional_data(),
                    #(Self::#variants(value) => value.additional_data(),)*
                }
            }
            fn additional_data_mut(&mut self) -> &mut #ser::AdditionalData {
                match self {
                    Self::#base(value) => value.additional_data_mut(),
                    #(Self::#variants(value) => value.additional_data_mut(),)*
                }
            }
            fn set_additional_data(&mut self, data: #ser::AdditionalData) {
                match self {
                    Self::#base(value) => value.set_additional_data(data),
                    #(Self::#variants(value) => value.set_additional_data(data),)*
                }
            }
        }

        impl serde::Serialize for #identifier {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self {
                    Self::#base(value) => serde::Serialize::serialize(value, serializer),
                    #(Self::#variants(value) => serde::Serialize::serialize(value, serializer),)*
                }
            }
        }

        impl<'de> serde::Deserialize<'de> for #identifier {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                let node = #ser::ParseNode::new(value);
                <Self as #ser::Parsable>::create_from_discriminator_value(Some(&node))
                    .map_err(serde::de::Error::custom)
            }
        }
    }
}
