use std::collections::HashMap;

use anyhow::{bail, Context};
use indexmap::IndexMap;
use log::debug;
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use crate::config::GeneratorConfig;
use crate::deserializer::{schema_name_from_ref, Discriminator, Schema, SchemaDef};
use crate::generator::field_name;

/// Wire name of the discriminator every root type carries.
pub(crate) const ODATA_TYPE: &str = "@odata.type";

/// A type for a field in a struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// A field referencing a struct generated elsewhere in the same scope.
    Named(String),
    /// A field referencing a polymorphic base type. The value is the base's type name,
    /// the field itself holds the `Any<Base>` enum so subtypes survive a round trip.
    Family(String),
    /// A field referencing a generated string enumeration.
    Enum(String),
    /// A collection of another type
    Array(Box<FieldType>),
    /// A language primitive
    Simple(Primitive),
    /// Untyped JSON, for schemas that carry no usable shape.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Int,
    Long,
    Float,
    Double,
    Bool,
    Uuid,
    Bytes,
    DateTime,
    Date,
    TimeOnly,
    Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Name on the wire, e.g. `displayName` or `@odata.type`.
    pub name: String,
    pub field_type: FieldType,
    pub description: Option<String>,
}

/// The definition for a struct-like type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    /// Type name of the direct base, embedded in the generated struct.
    pub base: Option<String>,
    /// Value `new()` writes into `@odata.type`. Set on types nothing derives from and on
    /// bases whose `@odata.type` property declares a default.
    pub discriminator_value: Option<String>,
    pub properties: Vec<Field>,
}

/// Definition for an Enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub values: Vec<String>,
}

/// A concrete type selectable through a base type's discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub discriminator_value: String,
    pub type_name: String,
    /// Accessors leading from the variant up to the family base, nearest first.
    pub base_path: Vec<String>,
}

/// A polymorphic base type and every subtype its discriminator mapping names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyDef {
    pub base: String,
    pub discriminator_property: String,
    pub base_discriminator_value: String,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityDef {
    Struct(StructDef),
    Enum(EnumDef),
    Family(FamilyDef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub description: Option<String>,
    pub def: EntityDef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaKind {
    Enum,
    Struct,
    Polymorphic,
}

/// An object schema with its `allOf` parts folded together.
#[derive(Debug)]
struct ObjectSchema {
    key: String,
    description: Option<String>,
    base: Option<String>,
    properties: IndexMap<String, Schema>,
    discriminator: Option<Discriminator>,
}

impl ObjectSchema {
    fn from_def(key: &str, def: SchemaDef) -> anyhow::Result<Self> {
        match def {
            SchemaDef::Object {
                description,
                properties,
                discriminator,
                ..
            } => Ok(Self {
                key: key.to_string(),
                description,
                base: None,
                properties: properties.unwrap_or_default(),
                discriminator,
            }),
            SchemaDef::AllOf {
                description,
                all_of,
                ..
            } => {
                let mut object = Self {
                    key: key.to_string(),
                    description,
                    base: None,
                    properties: IndexMap::new(),
                    discriminator: None,
                };
                for part in all_of {
                    match part {
                        Schema::Ref(schema_ref) => {
                            let name = schema_ref.get_schema_name();
                            if let Some(base) = &object.base {
                                bail!(
                                    "{key}: multiple inheritance from {base} and {name} \
                                     is not supported"
                                );
                            }
                            object.base = Some(name.to_string());
                        }
                        Schema::Def(SchemaDef::Object {
                            description,
                            properties,
                            discriminator,
                            ..
                        }) => {
                            object.description = object.description.or(description);
                            object.properties.extend(properties.unwrap_or_default());
                            if discriminator.is_some() {
                                object.discriminator = discriminator;
                            }
                        }
                        Schema::Def(other) => {
                            bail!(
                                "{key}: allOf may only combine a $ref with object schemas, \
                                 found {other:?}"
                            )
                        }
                    }
                }
                Ok(object)
            }
            other => bail!(
                "{key}: only object, allOf and string enum schemas are supported at the top \
                 level, found {other:?}"
            ),
        }
    }

    /// Discriminator mapping entries that name another schema.
    fn subtypes(&self) -> Vec<(&str, &str)> {
        self.discriminator
            .iter()
            .flat_map(|discriminator| discriminator.mapping.iter())
            .map(|(value, target)| (value.as_str(), schema_name_from_ref(target)))
            .filter(|(_, target)| *target != self.key)
            .collect()
    }

    fn is_polymorphic(&self) -> bool {
        !self.subtypes().is_empty()
    }

    /// The `default` the schema declares for its own `@odata.type` property.
    fn declared_discriminator(&self) -> Option<&str> {
        match self.properties.get(ODATA_TYPE)? {
            Schema::Def(SchemaDef::String { default, .. }) => default.as_deref(),
            _ => None,
        }
    }
}

struct Resolver<'a> {
    kinds: &'a HashMap<String, SchemaKind>,
    bases: &'a HashMap<String, String>,
    config: &'a GeneratorConfig,
}

impl Resolver<'_> {
    fn resolve(&self, schema: &Schema) -> anyhow::Result<FieldType> {
        let def = match schema {
            Schema::Ref(schema_ref) => return self.resolve_ref(schema_ref.get_schema_name()),
            Schema::Def(def) => def,
        };
        let field_type = match def {
            SchemaDef::String { format, .. } => FieldType::Simple(match format.as_deref() {
                Some("date-time") => Primitive::DateTime,
                Some("date") => Primitive::Date,
                Some("time") => Primitive::TimeOnly,
                Some("duration") => Primitive::Duration,
                Some("uuid") => Primitive::Uuid,
                Some("base64url") | Some("byte") => Primitive::Bytes,
                _ => Primitive::String,
            }),
            SchemaDef::Integer { format, .. } => FieldType::Simple(match format.as_deref() {
                Some("int64") => Primitive::Long,
                _ => Primitive::Int,
            }),
            SchemaDef::Number { format, .. } => FieldType::Simple(match format.as_deref() {
                Some("float") => Primitive::Float,
                Some("int32") => Primitive::Int,
                Some("int64") => Primitive::Long,
                _ => Primitive::Double,
            }),
            SchemaDef::Boolean { .. } => FieldType::Simple(Primitive::Bool),
            SchemaDef::Array { items, .. } => FieldType::Array(Box::new(self.resolve(items)?)),
            // Graph marks nullable navigations as `anyOf: [$ref, {type: object, nullable: true}]`
            SchemaDef::AnyOf { any_of, .. } => {
                match any_of.iter().find(|schema| matches!(schema, Schema::Ref(_))) {
                    Some(schema) => self.resolve(schema)?,
                    None => FieldType::Json,
                }
            }
            SchemaDef::AllOf { all_of, .. } if all_of.len() == 1 => self.resolve(&all_of[0])?,
            SchemaDef::Object { properties, .. }
                if properties.as_ref().map_or(true, IndexMap::is_empty) =>
            {
                FieldType::Json
            }
            other => bail!("inline schema {other:?} must be declared under components.schemas"),
        };
        Ok(field_type)
    }

    fn resolve_ref(&self, name: &str) -> anyhow::Result<FieldType> {
        let type_name = self.config.type_name(name);
        Ok(match self.kinds.get(name) {
            Some(SchemaKind::Enum) => FieldType::Enum(type_name),
            Some(SchemaKind::Struct) => FieldType::Named(type_name),
            Some(SchemaKind::Polymorphic) => FieldType::Family(type_name),
            None => bail!("unknown reference {name}"),
        })
    }

    /// The chain of base schemas from `schema` up to and including `ancestor`.
    fn ancestry(&self, schema: &str, ancestor: &str) -> anyhow::Result<Vec<String>> {
        let mut chain = Vec::new();
        let mut current = schema;
        while let Some(base) = self.bases.get(current) {
            chain.push(base.clone());
            if base == ancestor {
                return Ok(chain);
            }
            if chain.len() > self.bases.len() {
                bail!("inheritance cycle through {schema}");
            }
            current = base;
        }
        bail!("{schema} does not derive from {ancestor}")
    }

    fn parse_object(&self, object: &ObjectSchema) -> anyhow::Result<Vec<Entity>> {
        let name = self.config.type_name(&object.key);
        debug!("parsing {} as {}", object.key, name);

        let mut properties = Vec::new();
        for (wire_name, schema) in &object.properties {
            // the discriminator lives on the root type only
            if wire_name == ODATA_TYPE && object.base.is_some() {
                continue;
            }
            let field_type = self
                .resolve(schema)
                .with_context(|| format!("{}.{}", object.key, wire_name))?;
            properties.push(Field {
                name: wire_name.clone(),
                field_type,
                description: schema.description().map(str::to_string),
            });
        }
        if object.base.is_none() && !object.properties.contains_key(ODATA_TYPE) {
            properties.push(Field {
                name: ODATA_TYPE.to_string(),
                field_type: FieldType::Simple(Primitive::String),
                description: None,
            });
        }

        let polymorphic = object.is_polymorphic();
        let discriminator_value = match object.declared_discriminator() {
            Some(value) => Some(value.to_string()),
            None => (!polymorphic).then(|| format!("#{}", object.key)),
        };
        let mut entities = vec![Entity {
            name: name.clone(),
            description: object.description.clone(),
            def: EntityDef::Struct(StructDef {
                base: object.base.as_deref().map(|base| self.config.type_name(base)),
                discriminator_value,
                properties,
            }),
        }];
        if polymorphic {
            entities.push(self.parse_family(object, &name)?);
        }
        Ok(entities)
    }

    fn parse_family(&self, object: &ObjectSchema, name: &str) -> anyhow::Result<Entity> {
        let Some(discriminator) = &object.discriminator else {
            bail!("{}: polymorphic schema without a discriminator", object.key);
        };
        let mut variants = Vec::new();
        for (value, target) in object.subtypes() {
            if !matches!(
                self.kinds.get(target),
                Some(SchemaKind::Struct | SchemaKind::Polymorphic)
            ) {
                bail!(
                    "{}: discriminator value {value} maps to {target}, which is not an object \
                     schema",
                    object.key
                );
            }
            let base_path = self
                .ancestry(target, &object.key)
                .with_context(|| format!("{}: discriminator value {value}", object.key))?
                .iter()
                .map(|schema| field_name(&self.config.type_name(schema)))
                .collect();
            variants.push(Variant {
                discriminator_value: value.to_string(),
                type_name: self.config.type_name(target),
                base_path,
            });
        }
        debug!("{} has {} subtypes", name, variants.len());
        Ok(Entity {
            name: format!("Any{name}"),
            description: Some(format!(
                "A `{name}` or any of its subtypes, selected by `{}`.",
                discriminator.property_name
            )),
            def: EntityDef::Family(FamilyDef {
                base: name.to_string(),
                discriminator_property: discriminator.property_name.clone(),
                base_discriminator_value: format!("#{}", object.key),
                variants,
            }),
        })
    }
}

/// Turns the `components.schemas` map into the entities to generate.
/// Every polymorphic object produces its struct followed by an `Any<Name>` family.
pub fn parse_schema_def_collection(
    schemas: IndexMap<String, SchemaDef>,
    config: &GeneratorConfig,
) -> anyhow::Result<Vec<Entity>> {
    let mut kinds = HashMap::new();
    let mut entities = Vec::new();
    let mut objects = Vec::new();
    for (key, def) in schemas {
        match def {
            SchemaDef::Enum {
                description,
                enum_values,
                ..
            } => {
                entities.push(Entity {
                    name: config.type_name(&key),
                    description,
                    def: EntityDef::Enum(EnumDef {
                        values: enum_values,
                    }),
                });
                kinds.insert(key, SchemaKind::Enum);
            }
            def => objects.push(ObjectSchema::from_def(&key, def)?),
        }
    }

    for object in &objects {
        let kind = if object.is_polymorphic() {
            SchemaKind::Polymorphic
        } else {
            SchemaKind::Struct
        };
        kinds.insert(object.key.clone(), kind);
    }
    let bases = objects
        .iter()
        .filter_map(|object| Some((object.key.clone(), object.base.clone()?)))
        .collect::<HashMap<_, _>>();
    for (key, base) in &bases {
        if !matches!(
            kinds.get(base),
            Some(SchemaKind::Struct | SchemaKind::Polymorphic)
        ) {
            bail!("{key}: base type {base} is not an object schema");
        }
    }

    let resolver = Resolver {
        kinds: &kinds,
        bases: &bases,
        config,
    };
    let parsed = objects
        .par_iter()
        .map(|object| resolver.parse_object(object))
        .collect::<anyhow::Result<Vec<_>>>()?;
    entities.extend(parsed.into_iter().flatten());
    Ok(entities)
}
