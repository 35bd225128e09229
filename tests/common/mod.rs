#![allow(dead_code)]

use std::fs;
use std::path::Path;

use amygdala::DataSources;
use env_logger::{Builder, Env};

pub fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn"))
        .is_test(true)
        .try_init();
}

pub const DISEASE_CSV: &str = "\
itching,skin_rash,nodal_skin_eruptions,chills,vomiting,high_fever,cough,fatigue,breathlessness,prognosis
1,1,1,0,0,0,0,0,0,Fungal infection
1,1,0,0,0,0,0,0,0,Fungal infection
1,0,1,0,0,0,0,0,0,Fungal infection
1,1,1,0,0,0,0,0,0,Fungal infection
0,1,1,0,0,0,0,0,0,Fungal infection
0,0,0,1,1,1,0,1,0,Malaria
0,0,0,1,0,1,0,1,0,Malaria
0,0,0,1,1,1,0,0,0,Malaria
0,0,0,1,1,0,0,1,0,Malaria
0,0,0,1,1,1,0,1,0,Malaria
0,0,0,0,0,1,1,1,1,Bronchial Asthma
0,0,0,0,0,0,1,0,1,Bronchial Asthma
0,0,0,0,0,1,1,0,1,Bronchial Asthma
0,0,0,0,0,0,1,1,1,Bronchial Asthma
0,0,0,0,0,1,1,1,1,Bronchial Asthma
";

pub const EMOJI_TRAIN_CSV: &str = "\
,TEXT,Label
0,so sad and crying today,0
1,crying alone tonight so sad,0
2,feeling sad and lonely,0
3,crying again feeling lonely,0
4,so sad crying,0
5,i love you so much my love,1
6,sending love to my family,1
7,love this love that,1
8,my family is my love,1
9,love you family,1
10,so angry at this traffic,2
11,angry about the traffic again,2
12,this makes me so angry,2
13,angry angry traffic jam,2
14,@user so angry #traffic,2
15,@user #,1
";

pub const EMOJI_MAPPING_CSV: &str = "\
,emoticons,number
0,😢,0
1,❤️,1
2,😡,2
";

/// Writes the fixture datasets in the standard layout under `dir`.
pub fn write_fixtures(dir: &Path) -> DataSources {
    let sources = DataSources::from_data_dir(dir);
    fs::create_dir_all(dir.join("emoji")).unwrap();
    fs::write(&sources.disease_dataset, DISEASE_CSV).unwrap();
    fs::write(&sources.emoji_train, EMOJI_TRAIN_CSV).unwrap();
    fs::write(&sources.emoji_mapping, EMOJI_MAPPING_CSV).unwrap();
    sources
}
