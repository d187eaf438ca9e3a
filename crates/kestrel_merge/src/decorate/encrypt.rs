use std::sync::Arc;

use kestrel_common::config::MergeProperties;
use kestrel_common::datum::Datum;
use kestrel_common::error::{KestrelError, KestrelResult, MergeError};
use kestrel_common::schema::SchemaMetadata;
use kestrel_common::types::{DataType, DatabaseType};

use crate::context::StatementContext;
use crate::cursor::{BoxedCursor, RowCursor};
use crate::decorate::encryptor::Encryptor;
use crate::engine::{DecoratorProvider, ResultDecorator};
use crate::rule::{downcast_rule, EncryptRule, Rule};

/// Decorator provider registered with an [`EncryptRule`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EncryptDecoratorProvider;

impl DecoratorProvider for EncryptDecoratorProvider {
    fn new_instance(
        &self,
        _database_type: DatabaseType,
        rule: &dyn Rule,
        properties: &MergeProperties,
        _ctx: &StatementContext,
    ) -> KestrelResult<Box<dyn ResultDecorator>> {
        let encrypt = downcast_rule::<EncryptRule>(rule).ok_or_else(|| {
            KestrelError::internal_bug(
                "E-MERGE-002",
                "encrypt decorator provider registered with a non-encrypt rule",
                format!("rule={} kind={:?}", rule.id(), rule.kind()),
            )
        })?;
        Ok(Box::new(EncryptDecorator {
            rule: encrypt.clone(),
            query_with_cipher_column: properties.query_with_cipher_column,
        }))
    }
}

/// Decrypts the encrypted columns a statement projects.
#[derive(Debug)]
pub struct EncryptDecorator {
    rule: EncryptRule,
    query_with_cipher_column: bool,
}

impl EncryptDecorator {
    fn cipher_columns(&self, ctx: &StatementContext, schema: &SchemaMetadata) -> Vec<CipherColumn> {
        if !ctx.tables.iter().any(|t| t.eq_ignore_ascii_case(&self.rule.table)) {
            return Vec::new();
        }
        ctx.projections
            .iter()
            .enumerate()
            .filter_map(|(index, projection)| {
                let column = self.rule.column(&projection.name)?;
                let target_type = projection.data_type.clone().or_else(|| {
                    schema
                        .column(&self.rule.table, &projection.name)
                        .map(|c| c.data_type.clone())
                });
                Some(CipherColumn {
                    index,
                    name: projection.name.clone(),
                    encryptor: Arc::clone(&column.encryptor),
                    target_type,
                })
            })
            .collect()
    }
}

impl ResultDecorator for EncryptDecorator {
    fn decorate(
        &self,
        cursor: BoxedCursor,
        ctx: &StatementContext,
        schema: &SchemaMetadata,
    ) -> KestrelResult<BoxedCursor> {
        if !self.query_with_cipher_column {
            return Ok(cursor);
        }
        let columns = self.cipher_columns(ctx, schema);
        if columns.is_empty() {
            return Ok(cursor);
        }
        tracing::debug!(
            rule = self.rule.id().as_str(),
            columns = columns.len(),
            "decrypting projected cipher columns"
        );
        Ok(Box::new(DecryptedCursor { inner: cursor, columns }))
    }
}

struct CipherColumn {
    index: usize,
    name: String,
    encryptor: Arc<dyn Encryptor>,
    target_type: Option<DataType>,
}

impl CipherColumn {
    fn decrypt(&self, raw: &Datum) -> KestrelResult<Datum> {
        let plain = self.encryptor.decrypt(raw).map_err(|e| match e {
            KestrelError::Merge(MergeError::Decrypt { reason, .. }) => MergeError::Decrypt {
                column: self.name.clone(),
                reason,
            }
            .into(),
            other => other,
        })?;
        match (&plain, &self.target_type) {
            (Datum::Text(text), Some(target)) if *target != DataType::Text => {
                Datum::parse_as(text, target).ok_or_else(|| {
                    MergeError::Decrypt {
                        column: self.name.clone(),
                        reason: format!("plaintext does not parse as {}", target),
                    }
                    .into()
                })
            }
            _ => Ok(plain),
        }
    }
}

/// Cursor that decrypts cipher columns on read. Other columns pass through.
pub struct DecryptedCursor {
    inner: BoxedCursor,
    columns: Vec<CipherColumn>,
}

impl RowCursor for DecryptedCursor {
    fn next(&mut self) -> KestrelResult<bool> {
        self.inner.next()
    }

    fn value(&self, column_index: usize) -> KestrelResult<Datum> {
        let raw = self.inner.value(column_index)?;
        match self.columns.iter().find(|c| c.index == column_index) {
            Some(column) => column.decrypt(&raw),
            None => Ok(raw),
        }
    }

    fn column_count(&self) -> usize {
        self.inner.column_count()
    }
}
