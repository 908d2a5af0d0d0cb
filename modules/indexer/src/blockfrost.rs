//! Blockfrost-compatible REST client

use std::time::Duration;

use async_trait::async_trait;
use horrocard_common::{
    Address, AssetUnit, Lovelace, ProtocolParameters, TxHash, UTxOIdentifier, UnspentOutput, Value,
};
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use tracing::{debug, info};

use crate::{ChainIndexer, IndexerConfig, IndexerError, TransactionSummary};

/// Blockfrost's maximum page size
const PAGE_SIZE: usize = 100;

/// Used when the endpoint no longer reports `min_utxo`
const DEFAULT_MIN_UTXO: Lovelace = 1_000_000;

/// Bytes per ledger word, to turn `coins_per_utxo_size` into `coins_per_utxo_word`
const BYTES_PER_WORD: u64 = 8;

pub struct BlockfrostIndexer {
    client: Client,
    base_url: String,
    project_id: String,
    page_size: usize,
}

impl BlockfrostIndexer {
    pub fn new(config: &IndexerConfig) -> Result<Self, IndexerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.blockfrost_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            page_size: PAGE_SIZE,
        })
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("project_id", &self.project_id)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, IndexerError> {
        self.get_optional(endpoint).await?.ok_or_else(|| IndexerError::Status {
            status: StatusCode::NOT_FOUND.as_u16(),
            message: format!("{endpoint} not found"),
        })
    }

    /// GET `endpoint`, with HTTP 404 read as `None`
    async fn get_optional<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Option<T>, IndexerError> {
        debug!("GET {endpoint}");
        let response = self.request(self.client.get(self.url(endpoint))).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = check_status(response).await?.bytes().await?;
        serde_json::from_slice(&body).map(Some).map_err(|e| IndexerError::decode(endpoint, e))
    }
}

/// Turn an error status into `IndexerError::Status`, keeping Blockfrost's message
async fn check_status(response: Response) -> Result<Response, IndexerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorJson>(&body)
        .ok()
        .and_then(|error| error.message.or(error.error))
        .unwrap_or(body);
    Err(IndexerError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ChainIndexer for BlockfrostIndexer {
    async fn protocol_parameters(&self) -> Result<ProtocolParameters, IndexerError> {
        let params: ParametersJson = self.get("epochs/latest/parameters").await?;
        params.try_into()
    }

    async fn utxos(&self, address: &Address) -> Result<Vec<UnspentOutput>, IndexerError> {
        let mut utxos = Vec::new();
        for page in 1u32.. {
            let endpoint = format!("addresses/{address}/utxos?count={}&page={page}", self.page_size);
            let Some(batch) = self.get_optional::<Vec<UtxoJson>>(&endpoint).await? else {
                break;
            };
            let last = batch.len() < self.page_size;
            for utxo in batch {
                utxos.push(utxo.try_into()?);
            }
            if last {
                break;
            }
        }
        info!("Fetched {} UTxOs of {address}", utxos.len());
        Ok(utxos)
    }

    async fn balance(&self, address: &Address) -> Result<Lovelace, IndexerError> {
        let info: Option<AddressJson> = self.get_optional(&format!("addresses/{address}")).await?;
        match info {
            Some(info) => Ok(amount_to_value(&info.amount)?.lovelace),
            None => Ok(0),
        }
    }

    async fn transaction_history(
        &self,
        address: &Address,
    ) -> Result<Vec<TransactionSummary>, IndexerError> {
        let endpoint = format!("addresses/{address}/transactions?order=desc&count={}", self.page_size);
        let Some(entries) = self.get_optional::<Vec<AddressTxJson>>(&endpoint).await? else {
            return Ok(Vec::new());
        };

        let owner = address.to_string();
        let mut history = Vec::with_capacity(entries.len());
        for entry in entries {
            let hash = entry.tx_hash;
            let tx_endpoint = format!("txs/{hash}");
            let utxos_endpoint = format!("txs/{hash}/utxos");
            let (tx, utxos) = tokio::try_join!(
                self.get::<TxJson>(&tx_endpoint),
                self.get::<TxUtxosJson>(&utxos_endpoint),
            )?;
            history.push(TransactionSummary {
                hash,
                block_height: tx.block_height,
                block_time: tx.block_time,
                net_amount: utxos.net_amount(&owner)?,
                fee: tx.fees,
            });
        }

        history.sort_by(|a, b| {
            b.block_time.cmp(&a.block_time).then(b.block_height.cmp(&a.block_height))
        });
        Ok(history)
    }

    async fn submit(&self, transaction: &[u8]) -> Result<TxHash, IndexerError> {
        let response = self
            .request(self.client.post(self.url("tx/submit")))
            .header(CONTENT_TYPE, "application/cbor")
            .body(transaction.to_vec())
            .send()
            .await?;
        let body = check_status(response).await?.bytes().await?;
        let hash: TxHash =
            serde_json::from_slice(&body).map_err(|e| IndexerError::decode("tx/submit", e))?;
        info!("Submitted transaction {hash} ({} bytes)", transaction.len());
        Ok(hash)
    }

    async fn transaction_status(&self, hash: &TxHash) -> Result<bool, IndexerError> {
        let tx: Option<TxJson> = self.get_optional(&format!("txs/{hash}")).await?;
        Ok(tx.is_some())
    }

    async fn latest_slot(&self) -> Result<u64, IndexerError> {
        let block: BlockJson = self.get("blocks/latest").await?;
        block.slot.ok_or_else(|| IndexerError::Decode("latest block has no slot".into()))
    }
}

#[derive(Deserialize)]
struct ErrorJson {
    error: Option<String>,
    message: Option<String>,
}

/// `epochs/latest/parameters`; numbers arrive either as JSON numbers or strings
#[serde_as]
#[derive(Deserialize)]
struct ParametersJson {
    epoch: u64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    min_fee_a: u64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    min_fee_b: u64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    max_tx_size: u64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    key_deposit: u64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pool_deposit: u64,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    min_utxo: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    coins_per_utxo_word: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    coins_per_utxo_size: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    max_val_size: Option<u64>,
}

impl TryFrom<ParametersJson> for ProtocolParameters {
    type Error = IndexerError;

    fn try_from(json: ParametersJson) -> Result<Self, Self::Error> {
        let coins_per_utxo_word = json
            .coins_per_utxo_word
            .or_else(|| json.coins_per_utxo_size.and_then(|size| size.checked_mul(BYTES_PER_WORD)))
            .ok_or_else(|| IndexerError::Decode("no coins per UTxO word or size".into()))?;

        Ok(ProtocolParameters {
            epoch: json.epoch,
            min_fee_a: json.min_fee_a,
            min_fee_b: json.min_fee_b,
            min_utxo_value: json.min_utxo.unwrap_or(DEFAULT_MIN_UTXO),
            pool_deposit: json.pool_deposit,
            key_deposit: json.key_deposit,
            coins_per_utxo_word,
            max_value_size: json
                .max_val_size
                .unwrap_or(ProtocolParameters::default().max_value_size),
            max_tx_size: json.max_tx_size,
        })
    }
}

#[serde_as]
#[derive(Deserialize)]
struct AmountJson {
    unit: String,
    #[serde_as(as = "DisplayFromStr")]
    quantity: u64,
}

fn amount_to_value(amount: &[AmountJson]) -> Result<Value, IndexerError> {
    let mut value = Value::default();
    for entry in amount {
        let unit: AssetUnit =
            entry.unit.parse().map_err(|e| IndexerError::decode("amount unit", e))?;
        let quantity = value
            .quantity_of(&unit)
            .checked_add(entry.quantity)
            .ok_or_else(|| IndexerError::Decode(format!("{} quantity overflows", entry.unit)))?;
        match unit {
            AssetUnit::Lovelace => value.lovelace = quantity,
            AssetUnit::Native(policy, name) => value.insert_asset(policy, name, quantity),
        }
    }
    Ok(value)
}

#[derive(Deserialize)]
struct AddressJson {
    amount: Vec<AmountJson>,
}

#[derive(Deserialize)]
struct UtxoJson {
    address: Address,
    tx_hash: TxHash,
    output_index: u32,
    amount: Vec<AmountJson>,
}

impl TryFrom<UtxoJson> for UnspentOutput {
    type Error = IndexerError;

    fn try_from(json: UtxoJson) -> Result<Self, Self::Error> {
        Ok(UnspentOutput {
            utxo: UTxOIdentifier::new(json.tx_hash, json.output_index),
            address: json.address,
            value: amount_to_value(&json.amount)?,
        })
    }
}

#[derive(Deserialize)]
struct AddressTxJson {
    tx_hash: TxHash,
}

#[serde_as]
#[derive(Deserialize)]
struct TxJson {
    block_height: u64,
    block_time: i64,
    #[serde_as(as = "DisplayFromStr")]
    fees: Lovelace,
}

#[derive(Deserialize)]
struct TxIoJson {
    address: String,
    amount: Vec<AmountJson>,
}

#[derive(Deserialize)]
struct TxUtxosJson {
    inputs: Vec<TxIoJson>,
    outputs: Vec<TxIoJson>,
}

impl TxUtxosJson {
    /// Lovelace paid to `owner` minus lovelace spent from it
    fn net_amount(&self, owner: &str) -> Result<i64, IndexerError> {
        let total = |entries: &[TxIoJson]| -> Result<i128, IndexerError> {
            let mut sum = 0i128;
            for entry in entries.iter().filter(|entry| entry.address == owner) {
                sum += i128::from(amount_to_value(&entry.amount)?.lovelace);
            }
            Ok(sum)
        };
        let net = total(&self.outputs)? - total(&self.inputs)?;
        i64::try_from(net).map_err(|e| IndexerError::decode("net amount", e))
    }
}

#[derive(Deserialize)]
struct BlockJson {
    slot: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;
    use wiremock::matchers::{body_bytes, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ADDRESS: &str = "addr_test1vz2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzerspjrlsz";
    const OTHER: &str = "addr_test1vpu5vlrf4xkxv2qpwngf6cjhtw542ayty80v8dyr49rf5eg57c2qv";
    const POLICY: &str = "b0d07d45fe9514f80213f4020e5a61241458be626841cde717cb38a7";

    fn address() -> Address {
        ADDRESS.parse().unwrap()
    }

    fn indexer(server: &MockServer) -> BlockfrostIndexer {
        let config = IndexerConfig {
            blockfrost_url: format!("{}/", server.uri()),
            project_id: "preprodTest".into(),
            request_timeout_secs: 5,
            connect_timeout_secs: 5,
            confirmation_attempts: 1,
            confirmation_interval_secs: 1,
        };
        BlockfrostIndexer::new(&config).unwrap()
    }

    fn tx_hash(n: u8) -> String {
        hex::encode([n; 32])
    }

    /// Blockfrost amount entries from `unit:quantity` pairs
    fn amounts(entries: &[&str]) -> Vec<AmountJson> {
        let entries: Vec<_> = entries
            .iter()
            .map(|entry| {
                let (unit, quantity) = entry.rsplit_once(':').unwrap();
                json!({"unit": unit, "quantity": quantity})
            })
            .collect();
        serde_json::from_value(serde_json::Value::Array(entries)).unwrap()
    }

    fn utxo_json(n: u8) -> serde_json::Value {
        json!({
            "address": ADDRESS,
            "tx_hash": tx_hash(n),
            "tx_index": 0,
            "output_index": n as u32,
            "amount": [{"unit": "lovelace", "quantity": "2000000"}],
            "block": "7eb8e27d18686c7db9a18f8bbcfe34e3fed6e047afaa2d969904d15e934847e6",
            "data_hash": null,
        })
    }

    #[test]
    fn parameters_accept_numbers_and_strings() {
        let json = json!({
            "epoch": 225,
            "min_fee_a": 44,
            "min_fee_b": 155381,
            "max_tx_size": 16384,
            "key_deposit": "2000000",
            "pool_deposit": "500000000",
            "min_utxo": "1000000",
            "coins_per_utxo_word": "34482",
            "max_val_size": "5000",
            "price_mem": 0.0577,
        });
        let params: ProtocolParameters =
            serde_json::from_value::<ParametersJson>(json).unwrap().try_into().unwrap();
        assert_eq!(
            params,
            ProtocolParameters {
                epoch: 225,
                ..ProtocolParameters::default()
            }
        );
    }

    #[test]
    fn coins_per_utxo_word_falls_back_to_size() {
        let json = json!({
            "epoch": 400,
            "min_fee_a": 44,
            "min_fee_b": 155381,
            "max_tx_size": 16384,
            "key_deposit": "2000000",
            "pool_deposit": "500000000",
            "coins_per_utxo_word": null,
            "coins_per_utxo_size": "4310",
            "max_val_size": "5000",
        });
        let params: ProtocolParameters =
            serde_json::from_value::<ParametersJson>(json).unwrap().try_into().unwrap();
        assert_eq!(params.coins_per_utxo_word, 34_480);
        assert_eq!(params.min_utxo_value, DEFAULT_MIN_UTXO);
    }

    #[test_case(&["lovelace:42000000"] => (42_000_000, 0) ; "coin only")]
    #[test_case(&["lovelace:1000000", "lovelace:500000"] => (1_500_000, 0) ; "repeated coin is summed")]
    #[test_case(
        &["lovelace:42000000", "b0d07d45fe9514f80213f4020e5a61241458be626841cde717cb38a76e7574636f696e:12"]
        => (42_000_000, 12) ; "coin and token")]
    #[test_case(
        &["b0d07d45fe9514f80213f4020e5a61241458be626841cde717cb38a76e7574636f696e:5",
          "b0d07d45fe9514f80213f4020e5a61241458be626841cde717cb38a76e7574636f696e:7"]
        => (0, 12) ; "repeated token is summed")]
    fn amounts_become_values(entries: &[&str]) -> (u64, u64) {
        let amount = amounts(entries);
        let value = amount_to_value(&amount).unwrap();
        let unit: AssetUnit = format!("{POLICY}6e7574636f696e").parse().unwrap();
        (value.lovelace, value.quantity_of(&unit))
    }

    #[test_case("nonsense" ; "not hex")]
    #[test_case("b0d07d45fe95" ; "short policy")]
    #[test_case("b0d07d45fe9514f80213f4020e5a61241458be626841cde717cb38a76e7" ; "odd name")]
    #[test_case("zzd07d45fe9514f80213f4020e5a61241458be626841cde717cb38a7" ; "bad policy digits")]
    fn bad_unit_is_a_decode_error(unit: &str) {
        let amount = amounts(&[format!("{unit}:1").as_str()]);
        assert!(matches!(amount_to_value(&amount), Err(IndexerError::Decode(_))));
    }

    #[test]
    fn overflowing_quantity_is_a_decode_error() {
        let amount = amounts(&[format!("lovelace:{}", u64::MAX).as_str(), "lovelace:1"]);
        assert!(matches!(amount_to_value(&amount), Err(IndexerError::Decode(_))));
    }

    #[tokio::test]
    async fn fetches_parameters_with_project_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/epochs/latest/parameters"))
            .and(header("project_id", "preprodTest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "epoch": 90,
                "min_fee_a": 44,
                "min_fee_b": 155381,
                "max_tx_size": 16384,
                "key_deposit": "2000000",
                "pool_deposit": "500000000",
                "min_utxo": "1000000",
                "coins_per_utxo_word": "34482",
                "max_val_size": "5000",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let params = indexer(&server).protocol_parameters().await.unwrap();
        assert_eq!(params.epoch, 90);
        assert_eq!(params.min_fee_a, 44);
    }

    #[tokio::test]
    async fn walks_every_utxo_page() {
        let server = MockServer::start().await;
        let utxo_path = format!("/addresses/{ADDRESS}/utxos");
        Mock::given(method("GET"))
            .and(path(utxo_path.as_str()))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([utxo_json(1), utxo_json(2)])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(utxo_path.as_str()))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([utxo_json(3)])))
            .mount(&server)
            .await;

        let mut indexer = indexer(&server);
        indexer.page_size = 2;
        let utxos = indexer.utxos(&address()).await.unwrap();
        assert_eq!(utxos.len(), 3);
        assert_eq!(utxos[2].utxo.output_index, 3);
        assert_eq!(utxos[0].value, Value::from_lovelace(2_000_000));
        assert_eq!(utxos[0].address, address());
    }

    #[tokio::test]
    async fn unused_address_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "status_code": 404,
                "error": "Not Found",
                "message": "The requested component has not been found."
            })))
            .mount(&server)
            .await;

        let indexer = indexer(&server);
        assert!(indexer.utxos(&address()).await.unwrap().is_empty());
        assert_eq!(indexer.balance(&address()).await.unwrap(), 0);
        assert!(indexer.transaction_history(&address()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn balance_reads_the_lovelace_entry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/addresses/{ADDRESS}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "address": ADDRESS,
                "amount": [
                    {"unit": "lovelace", "quantity": "42000000"},
                    {"unit": format!("{POLICY}6e7574636f696e"), "quantity": "12"},
                ],
                "type": "shelley",
                "script": false,
            })))
            .mount(&server)
            .await;

        assert_eq!(indexer(&server).balance(&address()).await.unwrap(), 42_000_000);
    }

    #[tokio::test]
    async fn history_is_netted_and_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/addresses/{ADDRESS}/transactions").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"tx_hash": tx_hash(1), "tx_index": 0, "block_height": 10, "block_time": 1000},
                {"tx_hash": tx_hash(2), "tx_index": 0, "block_height": 20, "block_time": 2000},
            ])))
            .mount(&server)
            .await;

        // Received 5 ADA from elsewhere
        Mock::given(method("GET"))
            .and(path(format!("/txs/{}", tx_hash(1)).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hash": tx_hash(1), "block_height": 10, "block_time": 1000, "fees": "170000",
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/txs/{}/utxos", tx_hash(1)).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hash": tx_hash(1),
                "inputs": [{"address": OTHER, "amount": [{"unit": "lovelace", "quantity": "9000000"}]}],
                "outputs": [
                    {"address": ADDRESS, "amount": [{"unit": "lovelace", "quantity": "5000000"}]},
                    {"address": OTHER, "amount": [{"unit": "lovelace", "quantity": "3830000"}]},
                ],
            })))
            .mount(&server)
            .await;

        // Sent 2 ADA away, paying the fee
        Mock::given(method("GET"))
            .and(path(format!("/txs/{}", tx_hash(2)).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hash": tx_hash(2), "block_height": 20, "block_time": 2000, "fees": "180000",
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/txs/{}/utxos", tx_hash(2)).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hash": tx_hash(2),
                "inputs": [{"address": ADDRESS, "amount": [{"unit": "lovelace", "quantity": "5000000"}]}],
                "outputs": [
                    {"address": OTHER, "amount": [{"unit": "lovelace", "quantity": "2000000"}]},
                    {"address": ADDRESS, "amount": [{"unit": "lovelace", "quantity": "2820000"}]},
                ],
            })))
            .mount(&server)
            .await;

        let history = indexer(&server).transaction_history(&address()).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].hash.to_string(), tx_hash(2));
        assert_eq!(history[0].net_amount, -2_180_000);
        assert_eq!(history[0].fee, 180_000);
        assert_eq!(history[1].net_amount, 5_000_000);
        assert_eq!(history[1].block_height, 10);
    }

    #[tokio::test]
    async fn submits_cbor() {
        let server = MockServer::start().await;
        let tx = vec![0x84, 0xa0, 0xa0, 0xf5, 0xf6];
        Mock::given(method("POST"))
            .and(path("/tx/submit"))
            .and(header("content-type", "application/cbor"))
            .and(header("project_id", "preprodTest"))
            .and(body_bytes(tx.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(tx_hash(7))))
            .expect(1)
            .mount(&server)
            .await;

        let hash = indexer(&server).submit(&tx).await.unwrap();
        assert_eq!(hash.to_string(), tx_hash(7));
    }

    #[tokio::test]
    async fn rejected_submission_keeps_the_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tx/submit"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status_code": 400,
                "error": "Bad Request",
                "message": "transaction submit error ShelleyTxValidationError"
            })))
            .mount(&server)
            .await;

        match indexer(&server).submit(&[0x80]).await {
            Err(IndexerError::Status { status, message }) => {
                assert_eq!(status, 400);
                assert!(message.contains("ShelleyTxValidationError"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn status_follows_transaction_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/txs/{}", tx_hash(1)).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hash": tx_hash(1), "block_height": 10, "block_time": 1000, "fees": "170000",
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/txs/{}", tx_hash(2)).as_str()))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let indexer = indexer(&server);
        assert!(indexer.transaction_status(&tx_hash(1).parse().unwrap()).await.unwrap());
        assert!(!indexer.transaction_status(&tx_hash(2).parse().unwrap()).await.unwrap());
    }

    #[tokio::test]
    async fn latest_slot_from_tip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blocks/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "height": 2_000_000, "slot": 41_000_000, "epoch": 90,
            })))
            .mount(&server)
            .await;

        assert_eq!(indexer(&server).latest_slot().await.unwrap(), 41_000_000);
    }

    #[tokio::test]
    async fn server_errors_are_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;

        match indexer(&server).latest_slot().await {
            Err(IndexerError::Status { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
