use sea_orm::entity::prelude::*;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "image")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub file_name: String,
    #[sea_orm(unique)]
    pub path_name: String,
    pub extension: FileExtension,
}

impl Model {
    /// Name of the file on disk, relative to the upload directory.
    pub fn stored_name(&self) -> String {
        format!("{}.{}", self.path_name, self.extension)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Copy, PartialEq, Debug, EnumIter, DeriveActiveEnum)]
#[sea_orm(
    enum_name = "extension_enum",
    db_type = "String(StringLen::N(255))",
    rs_type = "String"
)]
pub enum FileExtension {
    #[sea_orm(string_value = "jpg")]
    JPG,
    #[sea_orm(string_value = "png")]
    PNG,
}

impl FileExtension {
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "image/jpeg" => Some(FileExtension::JPG),
            "image/png" => Some(FileExtension::PNG),
            _ => None,
        }
    }
}

impl FromStr for FileExtension {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jpg" => Ok(FileExtension::JPG),
            "png" => Ok(FileExtension::PNG),
            _ => Err(()),
        }
    }
}

impl fmt::Display for FileExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileExtension::JPG => f.write_str("jpg"),
            FileExtension::PNG => f.write_str("png"),
        }
    }
}
